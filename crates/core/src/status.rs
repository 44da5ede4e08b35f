//! Lifecycle status enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table. The string label is
//! what the HTTP layer exposes.

use crate::error::CoreError;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant, in lookup-table order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Lowercase label used in API payloads and the lookup table.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Map a database status ID back to the enum.
            pub fn from_id(id: StatusId) -> Option<Self> {
                Self::ALL.iter().copied().find(|s| s.id() == id)
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|status| status.as_str() == s)
                    .ok_or_else(|| {
                        CoreError::Validation(format!(
                            "Unknown {} '{s}'",
                            stringify!($name)
                        ))
                    })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Video lifecycle status.
    VideoStatus {
        Created = 1 => "created",
        Uploaded = 2 => "uploaded",
        Processing = 3 => "processing",
        Completed = 4 => "completed",
        Failed = 5 => "failed",
    }
}

define_status_enum! {
    /// Processing job status.
    JobStatus {
        Queued = 1 => "queued",
        Processing = 2 => "processing",
        Completed = 3 => "completed",
        Failed = 4 => "failed",
    }
}

impl JobStatus {
    /// `completed` and `failed` are final; nothing moves a job out of them.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether a job may move from `self` to `next`.
    ///
    /// The only legal path is `queued -> processing -> completed | failed`.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }
}

impl VideoStatus {
    /// Whether a video may move from `self` to `next`.
    ///
    /// A failed video can be re-uploaded or re-processed. A completed video
    /// is final.
    pub fn can_transition_to(self, next: VideoStatus) -> bool {
        use VideoStatus::*;
        matches!(
            (self, next),
            (Created, Uploaded)
                | (Uploaded, Uploaded)
                | (Uploaded, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Failed, Uploaded)
                | (Failed, Processing)
        )
    }

    /// Statuses a video may be in when moving to `next`, as status IDs.
    /// Conditional updates match the current row against this set.
    pub fn source_ids(next: VideoStatus) -> Vec<StatusId> {
        Self::ALL
            .iter()
            .filter(|status| status.can_transition_to(next))
            .map(|status| status.id())
            .collect()
    }
}
