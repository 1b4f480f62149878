mod bigmap;
mod codec;
mod compare;
mod diff;
mod miguel;
mod schema;
mod strings;

pub(crate) use bigmap::{cmd_bigmap_cells, cmd_bigmap_diff};
pub(crate) use codec::{cmd_pack, cmd_try_unpack, cmd_unpack};
pub(crate) use compare::cmd_compare;
pub(crate) use diff::cmd_diff;
pub(crate) use miguel::cmd_miguel;
pub(crate) use schema::{cmd_from_schema, cmd_schema};
pub(crate) use strings::cmd_strings;
