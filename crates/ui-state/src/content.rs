//! Rows and buttons of the place details panel

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Timelike};
use i18n::Localizer;
use map_api::{CalendarEvent, OpeningInterval};
use serde::{Deserialize, Serialize};

use crate::formatter::{format_floor_number, FormattedPlaceDetails};
use crate::interceptor::CallbackInterceptor;

/// Directions button id
pub const DIRECTIONS_BUTTON: &str = "mwz-directions-button";
/// Information button id
pub const INFORMATION_BUTTON: &str = "mwz-informations-button";
/// Call button id
pub const PHONE_BUTTON: &str = "mwz-phone-button";
/// Website button id
pub const WEBSITE_BUTTON: &str = "mwz-website-button";
/// Share button id
pub const SHARE_BUTTON: &str = "mwz-share-button";

/// Floor row id
pub const FLOOR_ROW: &str = "mwz-floor-row";
/// Website row id
pub const WEBSITE_ROW: &str = "mwz-website-row";
/// Phone row id
pub const PHONE_ROW: &str = "mwz-phone-row";
/// Capacity row id
pub const CAPACITY_ROW: &str = "mwz-capacity-row";
/// Opening hours row id
pub const OPENING_HOURS_ROW: &str = "mwz-openingHours-row";
/// Calendar row id
pub const CALENDAR_ROW: &str = "mwz-calendarEvents-row";

/// What a button or row does when tapped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ButtonAction {
    /// Start a direction to the place
    Direction,
    /// Forward to the host information hook
    Information,
    /// Dial a phone number
    Call(String),
    /// Open a URL
    Website(String),
    /// Share a link
    Share(String),
}

/// A button of the place panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonContent {
    /// Stable identifier
    pub id: String,
    /// Label
    pub title: String,
    /// Drawn with the accent color
    pub highlighted: bool,
    /// Tap action
    pub action: ButtonAction,
}

/// Opening hours of one weekday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHoursRow {
    /// Day index, 0 is Sunday
    pub day: u8,
    /// Day name
    pub day_label: String,
    /// Formatted intervals, or the "closed" label
    pub label: String,
}

/// Extra data attached to a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum RowData {
    /// Weekly opening hours, Monday first
    OpeningHours(Vec<OpeningHoursRow>),
    /// Booking calendar
    Calendar(Vec<CalendarEvent>),
}

/// A row of the place panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowContent {
    /// Stable identifier
    pub id: String,
    /// Label
    pub title: String,
    /// Whether the place has this information
    pub available: bool,
    /// Extra data
    pub data: Option<RowData>,
    /// Tap action
    pub action: Option<ButtonAction>,
}

impl RowContent {
    fn available(id: &str, title: String) -> Self {
        Self {
            id: id.to_string(),
            title,
            available: true,
            data: None,
            action: None,
        }
    }

    fn unavailable(id: &str, title: String) -> Self {
        Self {
            available: false,
            ..Self::available(id, title)
        }
    }

    fn with_action(mut self, action: ButtonAction) -> Self {
        self.action = Some(action);
        self
    }

    fn with_data(mut self, data: RowData) -> Self {
        self.data = Some(data);
        self
    }
}

/// Place panel content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceContent {
    /// Details and labels
    pub details: FormattedPlaceDetails,
    /// Information rows, available first
    pub rows: Vec<RowContent>,
    /// Action buttons
    pub buttons: Vec<ButtonContent>,
}

/// Build the place panel and let the host adjust it
pub fn build_place_content<Tz: TimeZone>(
    details: FormattedPlaceDetails,
    language: &str,
    uses24: bool,
    now: &DateTime<Tz>,
    localizer: &Localizer,
    interceptor: &dyn CallbackInterceptor,
) -> PlaceContent {
    let mut buttons = build_buttons(&details, language, localizer, interceptor);
    let mut rows = build_rows(&details, language, uses24, now, localizer);
    interceptor.on_place_selected(&details, &mut rows, &mut buttons);
    PlaceContent {
        details,
        rows,
        buttons,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Action buttons for `details`
pub fn build_buttons(
    details: &FormattedPlaceDetails,
    language: &str,
    localizer: &Localizer,
    interceptor: &dyn CallbackInterceptor,
) -> Vec<ButtonContent> {
    let place = &details.details;
    let mut buttons = vec![ButtonContent {
        id: DIRECTIONS_BUTTON.to_string(),
        title: localizer.direction(language),
        highlighted: true,
        action: ButtonAction::Direction,
    }];

    if interceptor.should_display_information_button(details) {
        buttons.push(ButtonContent {
            id: INFORMATION_BUTTON.to_string(),
            title: localizer.information(language),
            highlighted: false,
            action: ButtonAction::Information,
        });
    }
    if let Some(phone) = non_empty(&place.phone) {
        buttons.push(ButtonContent {
            id: PHONE_BUTTON.to_string(),
            title: localizer.call(language),
            highlighted: false,
            action: ButtonAction::Call(phone.to_string()),
        });
    }
    if let Some(website) = non_empty(&place.website) {
        buttons.push(ButtonContent {
            id: WEBSITE_BUTTON.to_string(),
            title: localizer.website(language),
            highlighted: false,
            action: ButtonAction::Website(website.to_string()),
        });
    }
    if let Some(link) = non_empty(&place.share_link) {
        buttons.push(ButtonContent {
            id: SHARE_BUTTON.to_string(),
            title: localizer.share(language),
            highlighted: false,
            action: ButtonAction::Share(link.to_string()),
        });
    }

    buttons
}

/// Information rows for `details`, available rows first
pub fn build_rows<Tz: TimeZone>(
    details: &FormattedPlaceDetails,
    language: &str,
    uses24: bool,
    now: &DateTime<Tz>,
    localizer: &Localizer,
) -> Vec<RowContent> {
    let place = &details.details;
    let mut rows = Vec::new();

    if let Some(floor) = &place.floor {
        let title = match floor.number {
            Some(number) => localizer.on_floor(language, &format_floor_number(number)),
            None => localizer.outdoor(language),
        };
        rows.push(RowContent::available(FLOOR_ROW, title));
    }

    rows.push(match non_empty(&place.website) {
        Some(website) => RowContent::available(WEBSITE_ROW, website.to_string())
            .with_action(ButtonAction::Website(website.to_string())),
        None => RowContent::unavailable(WEBSITE_ROW, localizer.website_not_available(language)),
    });

    rows.push(match non_empty(&place.phone) {
        Some(phone) => RowContent::available(PHONE_ROW, phone.to_string())
            .with_action(ButtonAction::Call(phone.to_string())),
        None => RowContent::unavailable(PHONE_ROW, localizer.phone_not_available(language)),
    });

    rows.push(match place.capacity.filter(|c| *c > 0) {
        Some(capacity) => RowContent::available(CAPACITY_ROW, capacity.to_string()),
        None => RowContent::unavailable(CAPACITY_ROW, localizer.capacity_not_available(language)),
    });

    if place.opening_hours.is_empty() {
        rows.push(RowContent::unavailable(
            OPENING_HOURS_ROW,
            localizer.opening_hours_not_available(language),
        ));
    } else {
        let status = if is_open(&place.opening_hours, now) {
            localizer.open_now(language)
        } else {
            localizer.closed_now(language)
        };
        rows.push(
            RowContent::available(OPENING_HOURS_ROW, status).with_data(RowData::OpeningHours(
                build_opening_hours(&place.opening_hours, language, uses24, localizer),
            )),
        );
    }

    match &place.calendar_events {
        Some(events) => {
            let status = if is_occupied(events, now) {
                localizer.currently_occupied(language)
            } else {
                localizer.currently_available(language)
            };
            rows.push(
                RowContent::available(CALENDAR_ROW, status).with_data(RowData::Calendar(events.clone())),
            );
        }
        None => rows.push(RowContent::unavailable(
            CALENDAR_ROW,
            localizer.schedule_not_available(language),
        )),
    }

    // Stable: keeps the relative order inside each group
    rows.sort_by_key(|row| !row.available);
    rows
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

fn format_time(value: &str, uses24: bool) -> String {
    match parse_time(value) {
        Some(time) if uses24 => time.format("%H:%M").to_string(),
        Some(time) => time.format("%-I:%M %p").to_string(),
        None => value.to_string(),
    }
}

/// Whether one of the intervals contains `now`, in the venue's wall clock
pub fn is_open<Tz: TimeZone>(intervals: &[OpeningInterval], now: &DateTime<Tz>) -> bool {
    let local = now.naive_local();
    let day = local.weekday().num_days_from_sunday() as u8;
    let time = match NaiveTime::from_hms_opt(local.hour(), local.minute(), 0) {
        Some(time) => time,
        None => return false,
    };

    intervals
        .iter()
        .filter(|interval| interval.day == day)
        .any(|interval| match (parse_time(&interval.open), parse_time(&interval.close)) {
            (Some(open), Some(close)) => open <= time && time < close,
            _ => false,
        })
}

/// Whether a calendar event is in progress at `now`
pub fn is_occupied<Tz: TimeZone>(events: &[CalendarEvent], now: &DateTime<Tz>) -> bool {
    events
        .iter()
        .any(|event| *now > event.start && *now < event.end)
}

/// One row per weekday, Monday first
pub fn build_opening_hours(
    intervals: &[OpeningInterval],
    language: &str,
    uses24: bool,
    localizer: &Localizer,
) -> Vec<OpeningHoursRow> {
    [1u8, 2, 3, 4, 5, 6, 0]
        .iter()
        .map(|&day| {
            let formatted: Vec<String> = intervals
                .iter()
                .filter(|interval| interval.day == day)
                .map(|interval| {
                    format!(
                        "{} - {}",
                        format_time(&interval.open, uses24),
                        format_time(&interval.close, uses24)
                    )
                })
                .collect();
            OpeningHoursRow {
                day,
                day_label: localizer.day(language, day),
                label: if formatted.is_empty() {
                    localizer.closed(language)
                } else {
                    formatted.join(", ")
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::build_place_details;
    use crate::interceptor::DefaultInterceptor;
    use chrono::Utc;
    use map_api::test_utils::fixtures;
    use map_api::FloorInfo;

    struct NoInformation;

    impl CallbackInterceptor for NoInformation {
        fn should_display_information_button(&self, _details: &FormattedPlaceDetails) -> bool {
            false
        }

        fn on_place_selected(
            &self,
            _details: &FormattedPlaceDetails,
            rows: &mut Vec<RowContent>,
            buttons: &mut Vec<ButtonContent>,
        ) {
            rows.retain(|r| r.id != CAPACITY_ROW);
            buttons.push(ButtonContent {
                id: "host-button".to_string(),
                title: "Book".to_string(),
                highlighted: false,
                action: ButtonAction::Website("https://book.example".to_string()),
            });
        }
    }

    fn localizer() -> Localizer {
        Localizer::new().unwrap()
    }

    // Wednesday
    fn wednesday(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, hour, minute, 0).unwrap()
    }

    fn full_details() -> FormattedPlaceDetails {
        let mut details = fixtures::place_details("p1", "Room");
        details.phone = Some("+33100000000".to_string());
        details.website = Some("https://room.example".to_string());
        details.share_link = Some("https://share.example/p1".to_string());
        details.capacity = Some(8);
        details.opening_hours = vec![
            OpeningInterval {
                day: 3,
                open: "09:00".to_string(),
                close: "12:30".to_string(),
            },
            OpeningInterval {
                day: 3,
                open: "14:00".to_string(),
                close: "18:00".to_string(),
            },
        ];
        details.calendar_events = Some(vec![CalendarEvent {
            name: None,
            start: wednesday(10, 0),
            end: wednesday(11, 0),
        }]);
        build_place_details(details, "en")
    }

    #[test]
    fn test_buttons_for_full_details() {
        let buttons = build_buttons(&full_details(), "en", &localizer(), &DefaultInterceptor);
        let ids: Vec<_> = buttons.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                DIRECTIONS_BUTTON,
                INFORMATION_BUTTON,
                PHONE_BUTTON,
                WEBSITE_BUTTON,
                SHARE_BUTTON
            ]
        );
        assert!(buttons[0].highlighted);
        assert_eq!(buttons[2].action, ButtonAction::Call("+33100000000".to_string()));
    }

    #[test]
    fn test_buttons_for_bare_details() {
        let details = build_place_details(fixtures::place_details("p1", "Room"), "en");
        let buttons = build_buttons(&details, "en", &localizer(), &NoInformation);
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].id, DIRECTIONS_BUTTON);
    }

    #[test]
    fn test_rows_for_bare_details_sort_available_first() {
        let details = build_place_details(fixtures::place_details("p1", "Room"), "en");
        let rows = build_rows(&details, "en", true, &wednesday(10, 30), &localizer());

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].id, FLOOR_ROW);
        assert_eq!(rows[0].title, "On floor 0");
        assert!(rows[0].available);
        assert!(rows[1..].iter().all(|r| !r.available));
        let ids: Vec<_> = rows[1..].iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![WEBSITE_ROW, PHONE_ROW, CAPACITY_ROW, OPENING_HOURS_ROW, CALENDAR_ROW]
        );
    }

    #[test]
    fn test_outdoor_floor_row() {
        let mut details = fixtures::place_details("p1", "Room");
        details.floor = Some(FloorInfo {
            number: None,
            translations: vec![],
        });
        let details = build_place_details(details, "en");
        let rows = build_rows(&details, "en", true, &wednesday(10, 30), &localizer());
        assert_eq!(rows[0].title, "Outdoor");
    }

    #[test]
    fn test_rows_for_full_details() {
        let rows = build_rows(&full_details(), "en", true, &wednesday(10, 30), &localizer());
        assert!(rows.iter().all(|r| r.available));

        let hours = rows.iter().find(|r| r.id == OPENING_HOURS_ROW).unwrap();
        assert_eq!(hours.title, "Open now");
        match &hours.data {
            Some(RowData::OpeningHours(days)) => {
                assert_eq!(days.len(), 7);
                assert_eq!(days[0].day, 1);
                assert_eq!(days[0].label, "Closed");
                assert_eq!(days[2].day, 3);
                assert_eq!(days[2].label, "09:00 - 12:30, 14:00 - 18:00");
            }
            other => panic!("unexpected row data {:?}", other),
        }

        let calendar = rows.iter().find(|r| r.id == CALENDAR_ROW).unwrap();
        assert_eq!(calendar.title, "Currently occupied");
    }

    #[test]
    fn test_closed_and_available_outside_intervals() {
        let rows = build_rows(&full_details(), "en", false, &wednesday(13, 0), &localizer());

        let hours = rows.iter().find(|r| r.id == OPENING_HOURS_ROW).unwrap();
        assert_eq!(hours.title, "Closed now");
        match &hours.data {
            Some(RowData::OpeningHours(days)) => {
                assert_eq!(days[2].label, "9:00 AM - 12:30 PM, 2:00 PM - 6:00 PM");
            }
            other => panic!("unexpected row data {:?}", other),
        }

        let calendar = rows.iter().find(|r| r.id == CALENDAR_ROW).unwrap();
        assert_eq!(calendar.title, "Currently available");
    }

    #[test]
    fn test_interceptor_adjusts_content() {
        let content = build_place_content(
            full_details(),
            "en",
            true,
            &wednesday(10, 30),
            &localizer(),
            &NoInformation,
        );

        assert!(content.rows.iter().all(|r| r.id != CAPACITY_ROW));
        assert!(content.buttons.iter().all(|b| b.id != INFORMATION_BUTTON));
        assert_eq!(content.buttons.last().unwrap().id, "host-button");
    }

    #[test]
    fn test_is_open_boundaries() {
        let intervals = vec![OpeningInterval {
            day: 3,
            open: "09:00".to_string(),
            close: "18:00".to_string(),
        }];
        assert!(is_open(&intervals, &wednesday(9, 0)));
        assert!(!is_open(&intervals, &wednesday(18, 0)));
        assert!(!is_open(&intervals, &wednesday(8, 59)));
        let thursday = Utc.with_ymd_and_hms(2026, 3, 5, 10, 0, 0).unwrap();
        assert!(!is_open(&intervals, &thursday));
    }
}
