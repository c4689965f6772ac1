//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for accounts, claims and uploaded images. Values
//! are fixed unless the fixture name says otherwise.

use chrono::{DateTime, TimeZone, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::Fake;

use domain_account::Credentials;
use domain_claims::{NewClaim, UploadedFile};

/// Fixture for account credentials
pub struct CredentialFixtures;

impl CredentialFixtures {
    /// Standard test email
    pub fn email() -> &'static str {
        "test@example.com"
    }

    /// Standard test password
    pub fn password() -> &'static str {
        "testpassword"
    }

    /// A random, syntactically valid email
    pub fn random_email() -> String {
        SafeEmail().fake()
    }

    /// Credentials for the standard test user
    pub fn standard() -> Credentials {
        Credentials::new(Self::email(), Self::password())
    }

    /// Credentials for a freshly generated user
    pub fn random() -> Credentials {
        Credentials::new(Self::random_email(), Self::password())
    }
}

/// Fixture for claim data
pub struct ClaimFixtures;

impl ClaimFixtures {
    pub fn policy_number() -> &'static str {
        "POL-2024-000123"
    }

    /// Accident date used by the standard claim (Jan 15, 2024 09:30 UTC)
    pub fn date_of_accident() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
    }

    /// A claim that passes every field rule
    pub fn new_claim() -> NewClaim {
        NewClaim {
            policy_number: Self::policy_number().to_string(),
            date_of_accident: Self::date_of_accident(),
            accident_type: "collision".to_string(),
            description: "Rear-ended while stopped at a red light".to_string(),
            injuries_reported: false,
            damage_details: "Rear bumper cracked, tail light broken".to_string(),
        }
    }
}

/// Fixture for uploaded image parts
pub struct ImageFixtures;

impl ImageFixtures {
    /// Start of a JFIF file
    pub fn jpeg_bytes() -> &'static [u8] {
        &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0xFF, 0xD9]
    }

    /// PNG signature followed by an empty IHDR header
    pub fn png_bytes() -> &'static [u8] {
        &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D]
    }

    /// A JPEG part under `images[0]`
    pub fn jpeg(filename: &str) -> UploadedFile {
        UploadedFile::new(
            "images[0]",
            filename,
            Some("image/jpeg".to_string()),
            Self::jpeg_bytes(),
        )
    }

    /// A video part that must be rejected
    pub fn mp4(filename: &str) -> UploadedFile {
        UploadedFile::new("images[0]", filename, Some("video/mp4".to_string()), &b"\x00\x00\x00\x18ftypmp42"[..])
    }
}
