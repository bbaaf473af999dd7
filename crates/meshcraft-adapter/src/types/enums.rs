/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
[UPDATE]: When the backend printer status vocabulary changes (keep the mapping table total)
*/

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a generation task, from submission to a finished 3D asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    GeneratingImages,
    ImagesReady,
    GeneratingModel,
    ModelReady,
    Failed,
}

impl TaskStatus {
    /// Backend is still working on this task
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Queued | Self::GeneratingImages | Self::GeneratingModel
        )
    }

    /// No further progress updates will arrive
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ModelReady | Self::Failed)
    }
}

/// Printer status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiPrinterStatus {
    Online,
    Offline,
    Printing,
    Paused,
    Error,
}

impl ApiPrinterStatus {
    pub const ALL: [ApiPrinterStatus; 5] = [
        ApiPrinterStatus::Online,
        ApiPrinterStatus::Offline,
        ApiPrinterStatus::Printing,
        ApiPrinterStatus::Paused,
        ApiPrinterStatus::Error,
    ];
}

/// Printer status used by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterStatus {
    Idle,
    Printing,
    Paused,
    Offline,
    Error,
}

impl PrinterStatus {
    pub const ALL: [PrinterStatus; 5] = [
        PrinterStatus::Idle,
        PrinterStatus::Printing,
        PrinterStatus::Paused,
        PrinterStatus::Offline,
        PrinterStatus::Error,
    ];

    /// Check that the backend mapping is a bijection over both vocabularies.
    ///
    /// Called once at startup; a failure means the table was edited into an
    /// inconsistent state.
    pub fn verify_mapping() -> Result<(), String> {
        for api in ApiPrinterStatus::ALL {
            let back = ApiPrinterStatus::from(PrinterStatus::from(api));
            if back != api {
                return Err(format!("{api:?} maps back to {back:?}"));
            }
        }
        for status in PrinterStatus::ALL {
            let back = PrinterStatus::from(ApiPrinterStatus::from(status));
            if back != status {
                return Err(format!("{status:?} maps back to {back:?}"));
            }
        }
        Ok(())
    }
}

impl From<ApiPrinterStatus> for PrinterStatus {
    fn from(status: ApiPrinterStatus) -> Self {
        match status {
            ApiPrinterStatus::Online => PrinterStatus::Idle,
            ApiPrinterStatus::Offline => PrinterStatus::Offline,
            ApiPrinterStatus::Printing => PrinterStatus::Printing,
            ApiPrinterStatus::Paused => PrinterStatus::Paused,
            ApiPrinterStatus::Error => PrinterStatus::Error,
        }
    }
}

impl From<PrinterStatus> for ApiPrinterStatus {
    fn from(status: PrinterStatus) -> Self {
        match status {
            PrinterStatus::Idle => ApiPrinterStatus::Online,
            PrinterStatus::Offline => ApiPrinterStatus::Offline,
            PrinterStatus::Printing => ApiPrinterStatus::Printing,
            PrinterStatus::Paused => ApiPrinterStatus::Paused,
            PrinterStatus::Error => ApiPrinterStatus::Error,
        }
    }
}

impl fmt::Display for PrinterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PrinterStatus::Idle => "idle",
            PrinterStatus::Printing => "printing",
            PrinterStatus::Paused => "paused",
            PrinterStatus::Offline => "offline",
            PrinterStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// Gallery ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Latest,
    Popular,
}

impl SortBy {
    pub fn as_query(&self) -> &'static str {
        match self {
            SortBy::Latest => "latest",
            SortBy::Popular => "popular",
        }
    }
}
