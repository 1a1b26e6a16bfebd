use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use ics::components::Property;
use ics::properties::{RRule, TzName};
use ics::{Daylight, Standard};

/// One observance (STANDARD or DAYLIGHT) of a VTIMEZONE
#[derive(Debug)]
pub struct ZoneRule {
    pub name: &'static str,
    pub offset_from: &'static str,
    pub offset_to: &'static str,
    pub dtstart: &'static str,
    pub month: u32,
    pub by_day: &'static str,
}

impl ZoneRule {
    pub fn rrule(&self) -> String {
        format!("FREQ=YEARLY;BYMONTH={};BYDAY={}", self.month, self.by_day)
    }

    fn standard(&self) -> Standard<'static> {
        let mut standard = Standard::new(self.dtstart, self.offset_from, self.offset_to);
        standard.push(TzName::new(self.name));
        standard.push(RRule::new(self.rrule()));
        standard
    }

    fn daylight(&self) -> Daylight<'static> {
        let mut daylight = Daylight::new(self.dtstart, self.offset_from, self.offset_to);
        daylight.push(TzName::new(self.name));
        daylight.push(RRule::new(self.rrule()));
        daylight
    }
}

/// The single named zone documents are written in
#[derive(Debug)]
pub struct ZoneDefinition {
    pub tzid: &'static str,
    pub tz: Tz,
    pub standard: ZoneRule,
    pub daylight: ZoneRule,
}

/// Australia/Sydney: AEDT from the first Sunday in October, AEST from the first Sunday in April
pub static SYDNEY: ZoneDefinition = ZoneDefinition {
    tzid: "Australia/Sydney",
    tz: chrono_tz::Australia::Sydney,
    standard: ZoneRule {
        name: "AEST",
        offset_from: "+1100",
        offset_to: "+1000",
        dtstart: "19700405T030000",
        month: 4,
        by_day: "1SU",
    },
    daylight: ZoneRule {
        name: "AEDT",
        offset_from: "+1000",
        offset_to: "+1100",
        dtstart: "19701004T020000",
        month: 10,
        by_day: "1SU",
    },
};

impl ZoneDefinition {
    /// The VTIMEZONE component declaring both observances
    pub fn to_ics(&self) -> ics::TimeZone<'static> {
        let mut timezone = ics::TimeZone::standard(self.tzid, self.standard.standard());
        timezone.push(Property::new("X-LIC-LOCATION", self.tzid));
        timezone.add_daylight(self.daylight.daylight());
        timezone
    }

    /// UTC offset in effect at a wall-clock time in this zone.
    ///
    /// Ambiguous times (the repeated hour in April) resolve to the earlier
    /// instant; times skipped in October have no offset.
    pub fn offset_at(&self, local: &NaiveDateTime) -> Option<FixedOffset> {
        match self.tz.from_local_datetime(local) {
            LocalResult::Single(dt) => Some(dt.offset().fix()),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.offset().fix()),
            LocalResult::None => None,
        }
    }

    /// Interpret a wall-clock time in this zone as an absolute instant
    pub fn to_utc(&self, local: &NaiveDateTime) -> Option<DateTime<Utc>> {
        let offset = self.offset_at(local)?;
        offset
            .from_local_datetime(local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, NaiveDate, Weekday};

    fn parse_offset(offset: &str) -> i32 {
        let sign = if offset.starts_with('-') { -1 } else { 1 };
        let hours: i32 = offset[1..3].parse().unwrap();
        let minutes: i32 = offset[3..5].parse().unwrap();
        sign * (hours * 3600 + minutes * 60)
    }

    fn first_sunday(year: i32, month: u32) -> NaiveDate {
        let mut day = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
        while day.weekday() != Weekday::Sun {
            day += Duration::days(1);
        }
        day
    }

    fn noon(date: NaiveDate) -> NaiveDateTime {
        date.and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_declared_rules_match_tz_database() {
        for year in 2024..=2030 {
            for rule in [&SYDNEY.standard, &SYDNEY.daylight] {
                let transition = first_sunday(year, rule.month);
                let before = SYDNEY
                    .offset_at(&noon(transition - Duration::days(1)))
                    .unwrap();
                let after = SYDNEY.offset_at(&noon(transition)).unwrap();

                assert_eq!(
                    before.local_minus_utc(),
                    parse_offset(rule.offset_from),
                    "{} {} before transition",
                    rule.name,
                    year
                );
                assert_eq!(
                    after.local_minus_utc(),
                    parse_offset(rule.offset_to),
                    "{} {} after transition",
                    rule.name,
                    year
                );
            }
        }
    }

    #[test]
    fn test_offset_at_straddling_april_2025() {
        let saturday = NaiveDate::from_ymd_opt(2025, 4, 5).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 4, 7).unwrap();

        assert_eq!(
            SYDNEY.offset_at(&noon(saturday)).unwrap().local_minus_utc(),
            11 * 3600
        );
        assert_eq!(
            SYDNEY.offset_at(&noon(monday)).unwrap().local_minus_utc(),
            10 * 3600
        );
    }

    #[test]
    fn test_gap_and_overlap() {
        let skipped = NaiveDate::from_ymd_opt(2025, 10, 5)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert_eq!(SYDNEY.offset_at(&skipped), None);
        assert_eq!(SYDNEY.to_utc(&skipped), None);

        let repeated = NaiveDate::from_ymd_opt(2025, 4, 6)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert_eq!(
            SYDNEY.offset_at(&repeated).unwrap().local_minus_utc(),
            11 * 3600
        );
    }

    #[test]
    fn test_vtimezone_block() {
        let out = SYDNEY.to_ics().to_string();

        let expected = [
            "BEGIN:VTIMEZONE",
            "TZID:Australia/Sydney",
            "X-LIC-LOCATION:Australia/Sydney",
            "BEGIN:STANDARD",
            "DTSTART:19700405T030000",
            "TZOFFSETFROM:+1100",
            "TZOFFSETTO:+1000",
            "TZNAME:AEST",
            "RRULE:FREQ=YEARLY;BYMONTH=4;BYDAY=1SU",
            "END:STANDARD",
            "BEGIN:DAYLIGHT",
            "DTSTART:19701004T020000",
            "TZOFFSETFROM:+1000",
            "TZOFFSETTO:+1100",
            "TZNAME:AEDT",
            "RRULE:FREQ=YEARLY;BYMONTH=10;BYDAY=1SU",
            "END:DAYLIGHT",
            "END:VTIMEZONE",
        ];
        assert_eq!(out, format!("{}\r\n", expected.join("\r\n")));
    }
}
