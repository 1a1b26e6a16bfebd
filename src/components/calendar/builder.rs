use super::attendees::resolve_attendees;
use super::escape::{escape_text, param_value};
use super::models::{Attendee, EventRecord};
use super::normalize::{
    AV_BRIEF_DESCRIPTION_KEY, AV_OTHER_NOTES_KEY, AV_REQUEST_LOCATION_KEY, AV_REQUIREMENTS_KEY,
};
use super::time::{DateFormatter, DateValue, TimeMode};
use super::timezone::{ZoneDefinition, SYDNEY};
use chrono::{DateTime, Utc};
use ics::components::{Component, Property};
use ics::parameters::{CUType, PartStat, Role, TzIDParam, CN, RSVP};
use ics::properties::{
    Action, Attendee as AttendeeProperty, CalScale, Description, DtEnd, DtStart, Location,
    Summary, Trigger,
};
use ics::ICalendar;
use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default PRODID of generated documents
pub const DEFAULT_PRODUCT_ID: &str = "-//mailcal//AV Booking Calendar//EN";
/// Default right-hand side of event UIDs
pub const DEFAULT_UID_DOMAIN: &str = "mailcal.local";

const DESCRIPTION_LABEL: &str = "Description:";
const ALARM_TRIGGER: &str = "-PT30M";
const ALARM_TEXT: &str = "Reminder";

/// Read-only settings shared by every document of a run
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSettings {
    pub mode: TimeMode,
    pub product_id: String,
    pub uid_domain: String,
    /// Invited to every event unless already listed explicitly
    pub fallback_attendees: Vec<Attendee>,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            mode: TimeMode::default(),
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            uid_domain: DEFAULT_UID_DOMAIN.to_string(),
            fallback_attendees: Vec::new(),
        }
    }
}

/// A finished iCalendar document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDocument {
    pub text: String,
    /// UIDs of the event blocks, in document order
    pub uids: Vec<String>,
}

impl CalendarDocument {
    pub fn event_count(&self) -> usize {
        self.uids.len()
    }
}

/// One VEVENT, with every value already formatted and escaped
struct EventBlock {
    uid: String,
    dtstamp: String,
    start: DateValue,
    end: DateValue,
    summary: String,
    location: String,
    description: String,
    attendees: Vec<Attendee>,
}

impl EventBlock {
    /// Property order here is what calendar clients get, keep it fixed
    fn to_ics(&self) -> Component<'_> {
        let mut ics_event = ics::Event::new(self.uid.as_str(), self.dtstamp.as_str());

        ics_event.push(date_property(DtStart::new(self.start.value.as_str()), &self.start));
        ics_event.push(date_property(DtEnd::new(self.end.value.as_str()), &self.end));
        ics_event.push(Summary::new(self.summary.as_str()));
        ics_event.push(Location::new(self.location.as_str()));
        ics_event.push(Description::new(self.description.as_str()));

        for attendee in &self.attendees {
            let mut property = AttendeeProperty::new(format!("mailto:{}", attendee.email.trim()));
            property.add(CN::new(param_value(&attendee.name)));
            property.add(CUType::INDIVIDUAL);
            property.add(Role::REQ_PARTICIPANT);
            property.add(PartStat::NEEDS_ACTION);
            property.add(RSVP::False);
            ics_event.push(property);
        }

        let mut component = Component::from(ics_event);
        component.add_component(reminder());
        component
    }
}

/// Display alarm with TRIGGER ahead of ACTION, which `ics::Alarm` cannot order
fn reminder() -> Component<'static> {
    let mut alarm = Component::new("VALARM");
    alarm.add_property(Trigger::new(ALARM_TRIGGER));
    alarm.add_property(Action::display());
    alarm.add_property(Description::new(ALARM_TEXT));
    alarm
}

/// Tag a DTSTART/DTEND with the zone when the value is wall-clock time
fn date_property<'a, P>(property: P, date: &DateValue) -> Property<'a>
where
    P: Into<Property<'a>>,
{
    let mut property = property.into();
    if let Some(tzid) = date.tzid {
        property.add(TzIDParam::new(tzid));
    }
    property
}

/// Builds one calendar document per batch of event records
pub struct CalendarBuilder<'a> {
    settings: &'a CalendarSettings,
    zone: &'static ZoneDefinition,
    formatter: DateFormatter,
}

impl<'a> CalendarBuilder<'a> {
    pub fn new(settings: &'a CalendarSettings) -> Self {
        Self {
            settings,
            zone: &SYDNEY,
            formatter: DateFormatter::new(settings.mode, &SYDNEY),
        }
    }

    pub fn build(&self, events: &[EventRecord]) -> CalendarDocument {
        self.build_at(events, Utc::now())
    }

    /// Build with an explicit creation timestamp
    pub fn build_at(&self, events: &[EventRecord], now: DateTime<Utc>) -> CalendarDocument {
        let dtstamp = self.formatter.format_stamp(now);
        let mut seen = HashSet::new();

        let blocks: Vec<EventBlock> = events
            .iter()
            .map(|event| {
                let uid = loop {
                    let candidate = format!("{}@{}", Uuid::new_v4(), self.settings.uid_domain);
                    if seen.insert(candidate.clone()) {
                        break candidate;
                    }
                };
                self.event_block(event, uid, dtstamp.clone())
            })
            .collect();

        let mut calendar = ICalendar::new("2.0", self.settings.product_id.as_str());
        calendar.push(CalScale::new("GREGORIAN"));
        if self.formatter.mode() == TimeMode::Zoned {
            calendar.add_timezone(self.zone.to_ics());
        }
        for block in &blocks {
            calendar.add_component(block.to_ics());
        }

        let text = calendar.to_string();
        debug!("Built calendar document with {} events", blocks.len());

        CalendarDocument {
            text,
            uids: blocks.into_iter().map(|block| block.uid).collect(),
        }
    }

    fn event_block(&self, event: &EventRecord, uid: String, dtstamp: String) -> EventBlock {
        let attendees = resolve_attendees(
            event.attendees.as_deref(),
            &self.settings.fallback_attendees,
        )
        .into_iter()
        .filter(|attendee| {
            let usable = attendee.is_addressable();
            if !usable {
                warn!("Leaving out attendee with unusable email {:?}", attendee.email);
            }
            usable
        })
        .collect();

        EventBlock {
            uid,
            dtstamp,
            start: self.formatter.format(&event.start),
            end: self.formatter.format(&event.end),
            summary: escape_text(&event.title),
            location: escape_text(event.location.as_deref().unwrap_or("")),
            description: escape_text(&composite_description(event)),
            attendees,
        }
    }
}

/// The AV annotations and the free-text description, one labelled line each
fn composite_description(event: &EventRecord) -> String {
    let fields = [
        (AV_REQUEST_LOCATION_KEY, &event.av.request_location),
        (AV_REQUIREMENTS_KEY, &event.av.requirements),
        (AV_BRIEF_DESCRIPTION_KEY, &event.av.brief_description),
        (AV_OTHER_NOTES_KEY, &event.av.other_notes),
        (DESCRIPTION_LABEL, &event.description),
    ];

    fields
        .iter()
        .map(|(label, value)| {
            format!("{} {}", label, value.as_deref().unwrap_or(""))
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
