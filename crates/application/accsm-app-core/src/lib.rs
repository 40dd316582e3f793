pub mod app_core;
mod async_runtime;
pub mod authoring;
pub mod cache;
pub mod client;
pub mod domain;
pub mod dragdrop;
pub mod error;
pub mod import;
pub mod kernel;
pub mod modals;
pub mod notice;
pub mod persistence;
pub mod ports;
pub mod review;
pub mod setups_path;
pub mod viewmodel;

pub use app_core::*;
pub use authoring::{PreparedSetup, SetupDraft, SetupEdit, SetupMeta};
pub use cache::{EntryState, Freshness, QueryCache, QueryKey};
pub use client::SetupClient;
pub use domain::{AppState, BootState, FormStatus, MainView, Preferences};
pub use dragdrop::{DragEvent, DragState, DropAction, DropRouter, DropTarget};
pub use error::{DraftError, GatewayError, PathError, RenameError};
pub use import::{ImportFlow, ImportPhase, ImportRunId, ImportSummary, RunKind, RunOutcome};
pub use kernel::AppKernel;
pub use modals::{ModalHooks, ModalSlot, ModalState, SetupModalData};
pub use notice::{Notice, NoticeLevel};
pub use persistence::FilePreferences;
pub use ports::*;
pub use review::{ReviewEdit, ValidationReview};
pub use setups_path::check_setups_path;
pub use viewmodel::*;
