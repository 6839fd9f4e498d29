//! Output generation.
//!
//! # Submodules
//!
//! - [`jsonl`]: Appends each [`SpeechRecord`](crate::models::SpeechRecord) as
//!   one JSON line as soon as it is extracted
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── speeches_2025-05-06_081500.jsonl
//! └── speeches_2025-05-07_081500.jsonl
//! ```

pub mod jsonl;
