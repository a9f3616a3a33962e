//! Lattice Flow
//!
//! Control-flow rendering primitives for the Lattice reactive UI framework.
//! It binds a fine-grained observable store to a retained view renderer so
//! that a data change re-renders only the scopes that read it.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Observables, observable lists, selectors and dependency tracking
//! - `view`: Nodes, elements, components and keys
//! - `host`: The renderer that mounts components as scopes and flushes them
//! - `flow`: `Show`, `Switch`, `Computed`, `Memo` and `For`
//!
//! # Example
//!
//! ```rust
//! use lattice_flow::flow::For;
//! use lattice_flow::host::Renderer;
//! use lattice_flow::reactive::ObservableList;
//! use lattice_flow::view::el;
//! use serde_json::json;
//!
//! let todos = ObservableList::from_vec(vec![
//!     json!({ "id": 1, "title": "write" }),
//!     json!({ "id": 2, "title": "test" }),
//! ]);
//!
//! let mut renderer = Renderer::new();
//! renderer
//!     .mount(
//!         For::each(&todos)
//!             .children(|todo| {
//!                 let title = todo.with(|todo| todo["title"].as_str().unwrap_or_default().to_owned());
//!                 Ok(el("li").text(title).into())
//!             })
//!             .into(),
//!     )
//!     .unwrap();
//! assert_eq!(renderer.to_html(), "<li>write</li><li>test</li>");
//!
//! // Only the first item re-renders.
//! todos.update_at(0, |todo| todo["title"] = json!("ship"));
//! assert_eq!(renderer.flush().unwrap(), 1);
//! assert_eq!(renderer.to_html(), "<li>ship</li><li>test</li>");
//! ```

pub mod error;
pub mod flow;
pub mod host;
pub mod reactive;
pub mod view;

pub use error::{RenderError, Result};
