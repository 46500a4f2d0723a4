//! # tgd-chase: keeping two peers consistent under tuple-generating dependencies
//!
//! **`tgd-chase`** computes the **chase fixpoint** of a set of tuple-generating
//! dependencies (TGDs) relating two peer fact-bases, a *source* and a *target*,
//! in the style of data exchange and peer-to-peer schema mappings.
//!
//! ## What is a TGD?
//!
//! A TGD is a rule `L -> R` between two conjunctive patterns:
//! whenever facts matching `L` exist, facts matching `R` must exist too.
//! Attributes that occur only in `R` are existentially quantified: when no
//! suitable value is present, the chase invents a **labeled null** (`_1`, `_2`, ...).
//!
//! Every dependency is applied from the source to the target, and its inverse
//! (`R -> L`) from the target back to the source, until nothing changes.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: all operations go through the
//!   [`KnowledgeBase`][crate::kb::KnowledgeBase], which owns both peers, the
//!   dependencies and the null counter.
//! - **All-or-Nothing Sync**: a sync attempt either commits both peers or rolls
//!   everything back, including pending local edits.
//! - **Edit Checking**: the chase may never re-derive a fact the peer asked to
//!   delete, nor drop a fact the peer has.
//! - **Observable**: an optional [`ChaseObserver`][crate::observer::ChaseObserver]
//!   sees every synthesized fact and every round; the `log` facade gets the details.
//!
//! ## Basic Usage
//!
//! ```rust
//! use tgd_chase::kb::{KnowledgeBase, SyncResult};
//! use tgd_chase::syntax::{parse_dependency, parse_fact};
//! use tgd_chase::types::Side;
//!
//! // 1. Initialize the knowledge base
//! let mut kb = KnowledgeBase::new();
//!
//! // 2. Define the mapping between the peers
//! kb.define_dependencies(vec![
//!     parse_dependency("R(x, y), S(x, z, w) -> T(x, y, z), V(w, x)").unwrap(),
//! ])
//! .unwrap();
//!
//! // 3. Make local edits on the source
//! kb.local_insert(Side::Source, parse_fact("R(1, 1)").unwrap()).unwrap();
//! kb.local_insert(Side::Source, parse_fact("S(1, 1, 4)").unwrap()).unwrap();
//!
//! // 4. Sync
//! assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);
//!
//! let target: Vec<String> = kb.current_image(Side::Target).iter().map(|f| f.to_string()).collect();
//! assert_eq!(target, ["T(1, 1, 1)", "V(4, 1)"]);
//! ```
//!
//! ## Core Components
//!
//! - **[`kb`]**: The knowledge base and the fixpoint driver.
//! - **[`chase`]**: The alpha/beta search applying one dependency.
//! - **[`tgd`]**: Dependencies and their attribute analysis.
//! - **[`image`]**: Peer state, image materialization and edit checking.
//! - **[`syntax`]**: Text syntax for dependencies and facts.

pub mod cell;
pub mod chase;
pub mod config;
pub mod error;
pub mod fact;
pub mod image;
pub mod kb;
pub mod observer;
pub mod syntax;
pub mod tgd;
pub mod types;
