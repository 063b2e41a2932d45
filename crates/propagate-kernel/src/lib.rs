//! # ifacepropagate kernel
//!
//! Go code generation for *interface propagation*: given a struct that embeds
//! an interface value, emit a method returning a value that implements the
//! embedded interface plus exactly those optional interfaces the embedded
//! value implements at runtime.
//!
//! ```go
//! type closeLoggedConn struct {
//!     net.Conn
//!     l *log.Logger
//! }
//!
//! // generated
//! func (l *closeLoggedConn) propagateInterfaces() net.Conn {
//!     _, ok0 := l.Conn.(io.ReaderFrom)
//!     switch {
//!     case ok0:
//!         return struct {
//!             net.Conn
//!             io.ReaderFrom
//!         }{l, l}
//!     case !ok0:
//!         return struct {
//!             net.Conn
//!         }{l}
//!     default:
//!         panic("unreachable")
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! selector   ← "l *closeLoggedConn.Conn", "io.ReaderFrom"
//!     │
//! resolve    ← struct member + interface method sets (via PackageLoader)
//!     │
//! alias      ← collision-free simple names
//!     │
//! matrix     ← type assertions + 2^N exclusive cases
//!     │
//! forward    ← one forwarding method per unique method name
//!     │
//! emit       ← goast → gofmt-style text
//! ```

pub mod alias;
pub mod capability;
pub mod emit;
pub mod error;
pub mod forward;
pub mod generate;
pub mod goast;
pub mod loader;
pub mod matrix;
pub mod model;
pub mod resolve;
pub mod selector;

pub use alias::{Alias, AliasOutcome, AliasTable, DEFAULT_ALIAS_PREFIX};
pub use capability::{CapabilityRef, StructSelector};
pub use error::{GenerateError, LoadError};
pub use forward::{ForwardPlan, Forwarder, ShadowedMethod, plan_forwarders};
pub use generate::{
    DEFAULT_DISPATCH_NAME, GENERATED_HEADER, GenerateOptions, Generated, propagate_interfaces,
};
pub use loader::{MemoryLoader, PackageLoader};
pub use matrix::{Combination, DispatchTable, MAX_OPTIONAL_CAPABILITIES};
pub use model::{Field, InterfaceType, MethodSig, NamedType, Package, Param, TypeKind, TypeRef};
pub use resolve::Resolver;
pub use selector::{CapabilityPath, SelectorSpec, split_capability_list};
