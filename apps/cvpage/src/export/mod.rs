// Zip export: page-relative asset fetching and the archive packager.

pub mod assets;
pub mod handlers;
pub mod packager;
