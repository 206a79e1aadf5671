#[cfg(feature = "youtube")]
pub mod youtube;

// Caption scraping, no API key
#[cfg(feature = "transcripts")]
pub mod transcripts;
