//! Deterministic, filename-driven summary content.
//!
//! The file stem is matched case-insensitively against a few keywords
//! (first match wins, in declaration order); anything else is `General`.

use serde::Serialize;
use serde_json::json;

use super::{ShotDescriptor, SummaryPayload};
use crate::naming;

/// Nominal duration assumed when the real one is unknown (30 s).
pub const DEFAULT_DURATION_MS: u32 = 30_000;

/// Timeline section boundaries as fractions of the total duration, with
/// their titles and descriptions.
const TIMELINE_SECTIONS: [(u32, u32, &str, &str); 4] = [
    (0, 7, "Introduction", "Opening and context setting"),
    (7, 15, "Main Content", "Core information and details"),
    (15, 22, "Examples", "Practical demonstrations"),
    (22, 30, "Conclusion", "Summary and next steps"),
];

/// Denominator for [`TIMELINE_SECTIONS`] boundaries.
const TIMELINE_SCALE: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Tutorial,
    Demo,
    Presentation,
    Meeting,
    General,
}

impl ContentCategory {
    const KEYWORDS: [(&'static str, ContentCategory); 4] = [
        ("tutorial", ContentCategory::Tutorial),
        ("demo", ContentCategory::Demo),
        ("presentation", ContentCategory::Presentation),
        ("meeting", ContentCategory::Meeting),
    ];

    /// Classify a file name by keyword.
    pub fn classify(file_name: &str) -> Self {
        let stem = naming::file_stem(file_name).to_lowercase();
        Self::KEYWORDS
            .iter()
            .find(|(keyword, _)| stem.contains(keyword))
            .map(|(_, category)| *category)
            .unwrap_or(ContentCategory::General)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentCategory::Tutorial => "tutorial",
            ContentCategory::Demo => "demo",
            ContentCategory::Presentation => "presentation",
            ContentCategory::Meeting => "meeting",
            ContentCategory::General => "general",
        }
    }

    fn bullets(self) -> [&'static str; 5] {
        match self {
            ContentCategory::Tutorial => [
                "Introduction to the topic",
                "Step-by-step instructions provided",
                "Key concepts explained clearly",
                "Practical examples demonstrated",
                "Summary and next steps outlined",
            ],
            ContentCategory::Demo => [
                "Product demonstration overview",
                "Key features highlighted",
                "User interface walkthrough",
                "Benefits and use cases shown",
                "Call to action presented",
            ],
            ContentCategory::Presentation => [
                "Opening remarks and agenda",
                "Main topics covered in detail",
                "Supporting data and statistics",
                "Key takeaways emphasized",
                "Q&A session and closing",
            ],
            ContentCategory::Meeting => [
                "Meeting objectives discussed",
                "Action items identified",
                "Decisions made and documented",
                "Next steps planned",
                "Follow-up schedule confirmed",
            ],
            ContentCategory::General => [
                "Content overview provided",
                "Main points highlighted",
                "Key information shared",
                "Important details covered",
                "Summary and conclusions",
            ],
        }
    }

    fn paragraph(self) -> &'static str {
        match self {
            ContentCategory::Tutorial => {
                "This tutorial provides a comprehensive walkthrough of the topic, covering \
                 essential concepts and practical implementation steps. The content is \
                 structured to help viewers understand both the theoretical foundation and \
                 hands-on application, making it suitable for beginners and intermediate users alike."
            }
            ContentCategory::Demo => {
                "This demonstration showcases the product's core functionality and user \
                 experience. Viewers will see how the features work in practice, understand \
                 the value proposition, and learn how to get started with their own implementation."
            }
            ContentCategory::Presentation => {
                "This presentation covers the key topics and insights relevant to the \
                 audience. The content is designed to inform, engage, and provide actionable \
                 takeaways that viewers can apply in their own context."
            }
            ContentCategory::Meeting => {
                "This meeting covered important topics and decisions that impact the team \
                 and project direction. Key outcomes include action items, decisions made, \
                 and next steps that will drive progress forward."
            }
            ContentCategory::General => {
                "This video contains valuable information and insights on the topic. The \
                 content is well-structured and provides viewers with key takeaways and \
                 actionable information they can use."
            }
        }
    }
}

impl std::fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split `[0, duration_ms)` into `count` contiguous shots.
///
/// The last shot absorbs the remainder so the shots always cover the full
/// duration. `count` is clamped so every shot is at least 1 ms long.
pub fn partition_shots(file_name: &str, duration_ms: u32, count: u32) -> Vec<ShotDescriptor> {
    let total = i64::from(duration_ms.clamp(1, i32::MAX as u32));
    let count = i64::from(count.max(1)).min(total);
    let step = total / count;

    (0..count)
        .map(|i| {
            let start = i * step;
            let end = if i == count - 1 { total } else { (i + 1) * step };
            ShotDescriptor {
                start_ms: start as i32,
                end_ms: end as i32,
                keyframe_path: Some(naming::keyframe_path(file_name, i as usize)),
            }
        })
        .collect()
}

/// Structured timeline for a category over `duration_ms`.
pub fn timeline(category: ContentCategory, duration_ms: u32) -> serde_json::Value {
    let at = |fraction: u32| {
        let ms = u64::from(duration_ms) * u64::from(fraction) / u64::from(TIMELINE_SCALE);
        format_timestamp(ms)
    };

    let segments: Vec<_> = TIMELINE_SECTIONS
        .iter()
        .map(|(start, end, title, description)| {
            json!({
                "start": at(*start),
                "end": at(*end),
                "title": title,
                "description": description,
            })
        })
        .collect();

    json!({
        "title": format!("Video Summary - {category}"),
        "duration": format_timestamp(u64::from(duration_ms)),
        "segments": segments,
    })
}

/// Bullets, paragraph and timeline for a category.
pub fn summarize(category: ContentCategory, duration_ms: u32) -> SummaryPayload {
    let bullets_md = category
        .bullets()
        .iter()
        .map(|line| format!("- {line}"))
        .collect::<Vec<_>>()
        .join("\n");

    SummaryPayload {
        bullets_md,
        paragraph_md: category.paragraph().to_string(),
        timeline: timeline(category, duration_ms),
    }
}

/// `mm:ss`, or `h:mm:ss` from one hour up. Seconds are truncated.
fn format_timestamp(ms: u64) -> String {
    let total_secs = ms / 1000;
    let (hours, minutes, seconds) = (total_secs / 3600, (total_secs / 60) % 60, total_secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
