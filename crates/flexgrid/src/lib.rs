//! `flexgrid` evaluates protection strategies for elastic optical networks. Given a topology of
//! ROADM nodes and fiber links and a set of bandwidth demands, it computes candidate paths once,
//! routes every demand with first-fit spectrum assignment under a chosen protection policy, and
//! reports the occupied spectrum and transponder count so policies can be compared.

#![warn(unreachable_pub, missing_docs)]

pub mod core;
pub mod impls;
pub mod utils;
