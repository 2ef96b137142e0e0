pub mod description;
pub mod document;
pub mod exception;
pub mod metadata;
pub mod pkginfo;
pub mod requirement;
pub mod util;
