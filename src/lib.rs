//! Service packages for a shared service container.
//!
//! A [`Package`](application::Package) bundles declarations: services,
//! tags grouping services, and default configuration merged beneath
//! whatever custom settings the container already holds.
//!
//! ```
//! use svcpack::application::demo::{GreeterPackage, Greeter, SupportPackage, GREETER};
//! use svcpack::domain::{settings, Value};
//! use svcpack::infrastructure::{Container, SharedContainer};
//! use svcpack::infrastructure::di::CONFIGURATION_KEY;
//!
//! let custom = settings([(GREETER, Value::from_iter([("greeting", "Howdy")]))]);
//! let container = SharedContainer::from(Container::with_parameters([(CONFIGURATION_KEY, custom)]));
//!
//! container.register(&mut SupportPackage::new()).unwrap();
//! container.register(&mut GreeterPackage::new()).unwrap();
//!
//! let greeter = container.resolve::<Greeter>(GREETER).unwrap();
//! assert_eq!(greeter.greet("Ada"), "Howdy, Ada!");
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
