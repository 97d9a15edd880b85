//! templatize — a line-oriented preprocessor for packaging templates.
//!
//! Templates are plain text with two kinds of markup:
//!
//! - conditional blocks, kept only when their flag is defined:
//!
//!   ```text
//!   #IF WINDOWS
//!   <Icon Id="chaskis.ico" SourceFile="chaskis.ico"/>
//!   #ENDIF
//!   ```
//!
//! - placeholders, replaced by caller-supplied values: `{%Version%}`.
//!
//! Rendering filters first and then substitutes. It is pure: reading
//! templates and writing results belongs to [`manifest`] and [`build`].
//!
//! ```
//! use templatize::{Defines, PlaceholderMap, render};
//!
//! let defines = Defines::from(["WINDOWS".to_string()]);
//! let values = PlaceholderMap::from([("Name".to_string(), "World".to_string())]);
//! let out = render("hello.template", "#IF WINDOWS\nHello {%Name%}!\n#ENDIF\n", &defines, &values).unwrap();
//! assert_eq!(out, "Hello World!\n");
//! ```

pub mod build;
pub mod diagnostic;
pub mod lexer;
pub mod logging;
pub mod manifest;
pub mod template;

pub use template::{ConditionalFault, Defines, PlaceholderMap, RenderError, Template, render};
