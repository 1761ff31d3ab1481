//! Post-run report links from cloud device farms.

mod browserstack;
mod provider;
mod resolver;

pub use browserstack::{parse_report_link, BrowserStackClient};
pub use provider::CloudProvider;
pub use resolver::ReportLinkResolver;
