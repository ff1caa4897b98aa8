use crate::{Filter, FilterContext, Result, RowLabeled, Value};

/// A model instance the adapter can persist and rehydrate.
///
/// The filter chains returned by [`Entity::filters`] run against every value
/// before it reaches statement generation. The entity itself is the filter
/// context, so a named filter that is not a built-in falls back to one of
/// its capabilities.
pub trait Entity: FilterContext + Send {
    /// Backend table the entity maps to.
    fn table(&self) -> &str;

    /// Column name and value pairs, in declaration order. The identifier
    /// column belongs here only when the backend does not generate it.
    fn row(&self) -> Vec<(String, Value)>;

    /// Filter chain for one column. Default: no filtering.
    fn filters(&self, column: &str) -> &[Filter] {
        let _ = column;
        &[]
    }

    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: i64);

    /// Whether this instance has been written to the backend at least once.
    fn persisted(&self) -> bool;
    fn mark_persisted(&mut self);

    fn from_row(row: &RowLabeled) -> Result<Self>
    where
        Self: Sized;
}
