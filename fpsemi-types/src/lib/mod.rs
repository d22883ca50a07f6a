// Copyright (c) 2024 the fpsemi authors
//
// The Universal Permissive License (UPL), Version 1.0
//
// Subject to the condition set forth below, permission is hereby granted to any person obtaining a
// copy of this software, associated documentation and/or data (collectively the "Software"), free
// of charge and under any and all copyright rights in the Software, and any and all patent rights
// owned or freely licensable by each licensor hereunder covering either (i) the unmodified
// Software as contributed to or provided by such licensor, or (ii) the Larger Works (as defined
// below), to deal in both
//
// (a) the Software, and
// (b) any piece of software and/or hardware listed in the lrgrwrks.txt file
// if one is included with the Software (each a "Larger Work" to which the Software is contributed
// by such licensors),
//
// without restriction, including without limitation the rights to copy, create derivative works
// of, display, perform, and distribute the Software and make, use, sell, offer for sale, import,
// export, have made, and have sold the Software and the Larger Work(s), and to sublicense the
// foregoing rights on either these or other terms.
//
// This license is subject to the following condition: The above copyright notice and either this
// complete permission notice or at a minimum a reference to the UPL must be included in all copies
// or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
// BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Shared vocabulary for the fpsemi workspace: words over a small finite
//! alphabet, relations between them, the index newtypes used to talk about
//! letters/cosets/rules/nodes without confusing one for another, and the
//! error enum raised at crate API boundaries.
//!
//! Terminology follows §3/§GLOSSARY:
//!
//!   * A *word* is a finite ordered sequence of *letters*, themselves small
//!     non-negative integers in `[0, n)`.
//!   * A *relation* is an ordered pair of words asserted equal.
//!   * An *alphabet* is a bijection between letters and `char`s, used only
//!     at the presentation boundary (§6 data format 1).

pub mod alphabet;
pub mod constants;
pub mod error;
pub mod idx;
pub mod word;

pub use alphabet::Alphabet;
pub use constants::ThreeValued;
pub use error::{Error, Result};
pub use idx::{Coset, Letter, NodeIdx, PointIdx, RuleId};
pub use word::{Relation, Word};
