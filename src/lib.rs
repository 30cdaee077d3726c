pub mod assets;
pub mod config;
pub mod controller;
pub mod error;
pub mod features;
pub mod feedback;
pub mod form;
pub mod i18n;
pub mod motion;
pub mod page;
pub mod prelude;
pub mod registry;
pub mod timing;

pub use controller::{InitReport, PageController};
pub use error::{PageError, PageResult};
pub use i18n::{I18nManager, Locale};
