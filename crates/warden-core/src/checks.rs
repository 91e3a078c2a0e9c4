//! Mock security-check responders
//!
//! None of these inspect anything: each returns a fixed verdict in the shape
//! the web layer renders and the history tables store.

use serde::Serialize;
use std::net::IpAddr;

use crate::validation;

/// Geolocation lookup result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeolocationReport {
    pub ip_address: String,
    pub location: String,
    pub isp: String,
    pub ip_type: &'static str,
    pub country_code: &'static str,
    pub region: &'static str,
    pub city: &'static str,
    pub postal_code: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: &'static str,
}

/// Link safety result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub url: String,
    pub is_safe: bool,
    pub risk_score: i64,
}

/// File scan result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub file_type: String,
    pub size_bytes: u64,
    pub is_safe: bool,
    pub scan_result: String,
}

/// Email phishing result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailReport {
    pub is_phishing: bool,
    pub confidence: u8,
    pub reasons: Vec<String>,
    pub suspicious_links: Vec<String>,
    pub suspicious_keywords: Vec<String>,
}

/// Phone number validation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneReport {
    pub is_valid: bool,
    pub provider: Option<&'static str>,
    pub formatted_number: Option<String>,
    pub location: &'static str,
}

/// Every address resolves to the same Baguio City record
pub fn geolocate(ip: IpAddr) -> GeolocationReport {
    GeolocationReport {
        ip_address: ip.to_string(),
        location: "Baguio City, Philippines".to_string(),
        isp: "PLDT".to_string(),
        ip_type: if ip.is_ipv4() { "IPv4" } else { "IPv6" },
        country_code: "PH",
        region: "Cordillera Administrative Region",
        city: "Baguio City",
        postal_code: "2600",
        latitude: 16.4023,
        longitude: 120.5960,
        timezone: "Asia/Manila",
    }
}

pub fn check_link(url: &str) -> LinkReport {
    LinkReport {
        url: url.to_string(),
        is_safe: true,
        risk_score: 10,
    }
}

/// File type is the lowercased extension, or `unknown`
pub fn scan_file(filename: &str, size_bytes: u64) -> FileReport {
    let file_type = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .map_or_else(|| "unknown".to_string(), str::to_lowercase);

    FileReport {
        filename: filename.to_string(),
        file_type,
        size_bytes,
        is_safe: true,
        scan_result: "No threats detected".to_string(),
    }
}

pub fn check_email(_content: &str) -> EmailReport {
    EmailReport {
        is_phishing: false,
        confidence: 10,
        reasons: vec!["Simplified check only".to_string()],
        suspicious_links: Vec::new(),
        suspicious_keywords: Vec::new(),
    }
}

/// Validate against the wallet contact-number pattern
pub fn validate_phone(number: &str) -> PhoneReport {
    match validation::format_contact_number(number) {
        Ok(formatted) => PhoneReport {
            is_valid: true,
            provider: Some("Globe"),
            formatted_number: Some(formatted),
            location: "Philippines",
        },
        Err(_) => PhoneReport {
            is_valid: false,
            provider: None,
            formatted_number: None,
            location: "Philippines",
        },
    }
}
