//! dotinject - Inject password-manager secrets into dotfile templates.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── inject        # Render templates to files
//! │   ├── scan          # List tokens and detected formats
//! │   ├── check         # Secret store readiness
//! │   ├── completions   # Shell completions
//! │   └── output        # Terminal styling helpers
//! └── core/             # Core library components
//!     ├── template/     # Token syntaxes
//!     │   ├── detect    # Format auto-detection
//!     │   ├── extract   # Token extraction
//!     │   └── render    # Substitution and render policy
//!     ├── store/        # Secret store backends
//!     │   ├── mod       # SecretStore trait
//!     │   ├── onepassword
//!     │   └── env
//!     ├── cache         # TTL lookup cache
//!     ├── resolver      # Cache-then-store resolution
//!     ├── driver        # Batch file processing
//!     ├── diff          # Dry-run line diffs
//!     ├── write         # Atomic writes and backups
//!     └── config        # config.toml and environment overrides
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dotinject::core::cache::{CachePolicy, SecretCache};
//! use dotinject::core::resolver::Resolver;
//! use dotinject::core::store::EnvStore;
//! use dotinject::core::template::{Renderer, RenderOutcome};
//!
//! let mut resolver = Resolver::new(EnvStore::new(), SecretCache::new(CachePolicy::default()));
//! let outcome = Renderer::default().run("token=${GITHUB_TOKEN}", |k| resolver.resolve(k))?;
//! ```

pub mod cli;
pub mod core;
pub mod error;
