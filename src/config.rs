use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use dotenvy::dotenv;

use crate::utils::geofence::Facility;

/// Working-hour thresholds used by the report builder.
#[derive(Debug, Clone, Copy)]
pub struct WorkPolicy {
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    /// check-in strictly after this is late
    pub late_after: NaiveTime,
    /// check-out strictly before this is an early leave
    pub early_before: NaiveTime,
}

impl Default for WorkPolicy {
    fn default() -> Self {
        Self {
            work_start: hm(9, 0),
            work_end: hm(17, 0),
            late_after: hm(9, 5),
            early_before: hm(17, 0),
        }
    }
}

fn hm(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap_or_default()
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_dir: String,

    // Storage
    pub data_dir: PathBuf,
    pub users_file: String,
    pub attendance_file: String,
    pub report_file: String,

    pub facility: Facility,
    pub work: WorkPolicy,

    // Requests per minute per peer IP on /auth
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_dir: "logs".to_string(),
            data_dir: PathBuf::from("data"),
            users_file: "users.json".to_string(),
            attendance_file: "attendance.json".to_string(),
            report_file: "main_report.csv".to_string(),
            facility: Facility::new(25.58883, 56.26589, 50.0),
            work: WorkPolicy::default(),
            rate_login_per_min: 60,
            rate_register_per_min: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let defaults = Self::default();

        let facility = Facility::new(
            parse_var("FACILITY_LAT", defaults.facility.lat)?,
            parse_var("FACILITY_LNG", defaults.facility.lng)?,
            parse_var("FACILITY_RADIUS_M", defaults.facility.radius_m)?,
        );

        let work = WorkPolicy {
            work_start: time_var("WORK_START", defaults.work.work_start)?,
            work_end: time_var("WORK_END", defaults.work.work_end)?,
            late_after: time_var("LATE_AFTER", defaults.work.late_after)?,
            early_before: time_var("EARLY_BEFORE", defaults.work.early_before)?,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),

            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            users_file: env::var("USERS_FILE").unwrap_or(defaults.users_file),
            attendance_file: env::var("ATTENDANCE_FILE").unwrap_or(defaults.attendance_file),
            report_file: env::var("REPORT_FILE").unwrap_or(defaults.report_file),

            facility,
            work,

            rate_login_per_min: parse_var("RATE_LOGIN_PER_MIN", defaults.rate_login_per_min)?,
            rate_register_per_min: parse_var(
                "RATE_REGISTER_PER_MIN",
                defaults.rate_register_per_min,
            )?,
        })
    }

    pub fn server_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid value, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn time_var(key: &str, default: NaiveTime) -> Result<NaiveTime> {
    match env::var(key) {
        Ok(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .with_context(|| format!("{key} must be HH:MM, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_facility() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.facility.radius_m, 50.0);
        assert_eq!(config.work.late_after, hm(9, 5));
        assert_eq!(config.work.early_before, hm(17, 0));
    }

    #[test]
    fn time_var_falls_back_when_unset() {
        let parsed = time_var("GEO_ATTENDANCE_UNSET_TIME_VAR", hm(8, 30)).unwrap();
        assert_eq!(parsed, hm(8, 30));
    }

    #[test]
    fn parse_var_reads_an_override() {
        unsafe { env::set_var("GEO_ATTENDANCE_TEST_PORT", " 8081 ") };
        let port: u16 = parse_var("GEO_ATTENDANCE_TEST_PORT", 3000).unwrap();
        unsafe { env::remove_var("GEO_ATTENDANCE_TEST_PORT") };
        assert_eq!(port, 8081);
    }

    #[test]
    fn parse_error_names_the_variable() {
        unsafe { env::set_var("GEO_ATTENDANCE_TEST_RADIUS", "fifty") };
        let err = parse_var::<f64>("GEO_ATTENDANCE_TEST_RADIUS", 50.0).unwrap_err();
        unsafe { env::remove_var("GEO_ATTENDANCE_TEST_RADIUS") };
        assert!(err.to_string().contains("GEO_ATTENDANCE_TEST_RADIUS"));
        assert!(err.to_string().contains("fifty"));
    }

    #[test]
    fn time_var_rejects_non_clock_values() {
        unsafe { env::set_var("GEO_ATTENDANCE_TEST_LATE_AFTER", "9am") };
        let err = time_var("GEO_ATTENDANCE_TEST_LATE_AFTER", hm(9, 5)).unwrap_err();
        unsafe { env::set_var("GEO_ATTENDANCE_TEST_LATE_AFTER", "08:45") };
        let parsed = time_var("GEO_ATTENDANCE_TEST_LATE_AFTER", hm(9, 5)).unwrap();
        unsafe { env::remove_var("GEO_ATTENDANCE_TEST_LATE_AFTER") };

        assert_eq!(err.to_string(), "GEO_ATTENDANCE_TEST_LATE_AFTER must be HH:MM, got \"9am\"");
        assert_eq!(parsed, hm(8, 45));
    }
}
