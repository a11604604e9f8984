//! Metadata tables of the `#~` stream (ECMA-335 §II.22).
//!
//! Only the column layout of every table is modelled, which is what locating a table inside
//! the stream requires. Rows are decoded for the handful of tables that describe types,
//! methods, parameters, generic parameters and custom attributes.

mod codedindex;
mod rows;
mod table;
mod tableid;
mod tableinfo;

pub use codedindex::{CodedIndex, CodedIndexType};
pub use rows::{
    CustomAttributeRaw, GenericParamRaw, MemberRefRaw, MethodDefRaw, NestedClassRaw, ParamRaw,
    TypeDefRaw, TypeRefRaw, TypeSpecRaw,
};
pub use table::{MetadataTable, RowReadable, TableInfoRef, TableIterator};
pub use tableid::TableId;
pub use tableinfo::TableInfo;
