//! Server time zones accepted by Aurora MySQL
//!
//! Aurora MySQL only accepts a fixed set of values for its `time_zone`
//! cluster parameter. Aurora PostgreSQL takes any IANA zone name, so its
//! `timezone` is not checked against this list.

use crate::props::engine::EngineKind;

pub const UTC: &str = "UTC";
pub const ASIA_TAIPEI: &str = "Asia/Taipei";
pub const ASIA_TOKYO: &str = "Asia/Tokyo";
pub const ASIA_SINGAPORE: &str = "Asia/Singapore";
pub const US_EASTERN: &str = "US/Eastern";
pub const US_PACIFIC: &str = "US/Pacific";
pub const EUROPE_DUBLIN: &str = "Europe/Dublin";

/// Values of the Aurora MySQL `time_zone` parameter
pub const MYSQL_TIME_ZONES: &[&str] = &[
    "Africa/Cairo",
    "Africa/Casablanca",
    "Africa/Harare",
    "Africa/Monrovia",
    "Africa/Nairobi",
    "Africa/Tripoli",
    "Africa/Windhoek",
    "America/Araguaina",
    "America/Asuncion",
    "America/Bogota",
    "America/Buenos_Aires",
    "America/Caracas",
    "America/Chihuahua",
    "America/Cuiaba",
    "America/Denver",
    "America/Fortaleza",
    "America/Guatemala",
    "America/Halifax",
    "America/Manaus",
    "America/Matamoros",
    "America/Monterrey",
    "America/Montevideo",
    "America/Phoenix",
    "America/Santiago",
    "America/Tijuana",
    "Asia/Amman",
    "Asia/Ashgabat",
    "Asia/Baghdad",
    "Asia/Baku",
    "Asia/Bangkok",
    "Asia/Beirut",
    "Asia/Calcutta",
    "Asia/Damascus",
    "Asia/Dhaka",
    "Asia/Irkutsk",
    "Asia/Jerusalem",
    "Asia/Kabul",
    "Asia/Karachi",
    "Asia/Kathmandu",
    "Asia/Krasnoyarsk",
    "Asia/Magadan",
    "Asia/Muscat",
    "Asia/Novosibirsk",
    "Asia/Riyadh",
    "Asia/Seoul",
    "Asia/Shanghai",
    ASIA_SINGAPORE,
    ASIA_TAIPEI,
    "Asia/Tehran",
    ASIA_TOKYO,
    "Asia/Ulaanbaatar",
    "Asia/Vladivostok",
    "Asia/Yakutsk",
    "Asia/Yerevan",
    "Atlantic/Azores",
    "Australia/Adelaide",
    "Australia/Brisbane",
    "Australia/Darwin",
    "Australia/Hobart",
    "Australia/Perth",
    "Australia/Sydney",
    "Brazil/East",
    "Canada/Newfoundland",
    "Canada/Saskatchewan",
    "Europe/Amsterdam",
    "Europe/Athens",
    EUROPE_DUBLIN,
    "Europe/Helsinki",
    "Europe/Istanbul",
    "Europe/Kaliningrad",
    "Europe/Moscow",
    "Europe/Paris",
    "Europe/Prague",
    "Europe/Sarajevo",
    "Pacific/Auckland",
    "Pacific/Fiji",
    "Pacific/Guam",
    "Pacific/Honolulu",
    "Pacific/Samoa",
    "US/Alaska",
    "US/Central",
    US_EASTERN,
    "US/East-Indiana",
    US_PACIFIC,
    UTC,
];

/// Check a server time zone against what the engine accepts
pub fn is_supported_time_zone(kind: EngineKind, time_zone: &str) -> bool {
    match kind {
        EngineKind::AuroraMysql => MYSQL_TIME_ZONES.contains(&time_zone),
        EngineKind::AuroraPostgresql => !time_zone.trim().is_empty(),
    }
}
