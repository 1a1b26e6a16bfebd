mod attendees;
mod builder;
mod escape;
pub mod models;
mod normalize;
mod time;
pub mod timezone;

pub use attendees::resolve_attendees;
pub use builder::{
    CalendarBuilder, CalendarDocument, CalendarSettings, DEFAULT_PRODUCT_ID, DEFAULT_UID_DOMAIN,
};
pub use escape::{escape_text, param_value};
pub use models::{Attendee, AvSupport, DateField, EventRecord, ParsedDateTime, DEFAULT_TITLE};
pub use normalize::{
    normalize, AV_BRIEF_DESCRIPTION_KEY, AV_OTHER_NOTES_KEY, AV_REQUEST_LOCATION_KEY,
    AV_REQUIREMENTS_KEY,
};
pub use time::{parse_datetime, read_date_field, DateFormatter, DateValue, TimeMode};
