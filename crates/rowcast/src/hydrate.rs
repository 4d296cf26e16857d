//! Rows → DTOs.

use crate::cast::{TypeCaster, TypeCasterRegistry};
use crate::connection::RowStream;
use crate::dto::{Dto, FieldDef, FieldType};
use crate::error::{OrmError, OrmResult};
use crate::mapping::ResultSetMapping;
use crate::naming::{NameConverter, SnakeCaseConverter};
use crate::row::Row;
use crate::value::Value;
use futures_core::Stream;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Builds DTOs from rows.
///
/// Every DTO starts out blank (all mapped properties unset); only columns
/// present in the row are cast to the declared property type and assigned.
#[derive(Clone)]
pub struct Hydrator {
    type_caster: Arc<dyn TypeCaster>,
    name_converter: Arc<dyn NameConverter>,
}

impl Default for Hydrator {
    fn default() -> Self {
        Self::new(TypeCasterRegistry::with_defaults(), SnakeCaseConverter)
    }
}

impl std::fmt::Debug for Hydrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hydrator").finish_non_exhaustive()
    }
}

impl Hydrator {
    pub fn new(
        type_caster: impl TypeCaster + 'static,
        name_converter: impl NameConverter + 'static,
    ) -> Self {
        Self::from_arcs(Arc::new(type_caster), Arc::new(name_converter))
    }

    pub fn from_arcs(
        type_caster: Arc<dyn TypeCaster>,
        name_converter: Arc<dyn NameConverter>,
    ) -> Self {
        Self {
            type_caster,
            name_converter,
        }
    }

    pub fn hydrate<T: Dto>(&self, row: &Row, rsm: Option<&ResultSetMapping<T>>) -> OrmResult<T> {
        let mut dto = T::blank();

        match rsm {
            Some(rsm) => {
                for (column, property) in rsm.fields() {
                    let Some(raw) = row.get(column) else {
                        continue;
                    };
                    let def = T::field_def(property)
                        .ok_or_else(|| OrmError::unknown_property(T::SHORT_NAME, property))?;
                    self.assign(&mut dto, def, raw)?;
                }
            }
            None => {
                for def in T::FIELDS {
                    let column = self.name_converter.to_column_name(def.name);
                    if let Some(raw) = row.get(&column) {
                        self.assign(&mut dto, def, raw)?;
                    }
                }
            }
        }

        Ok(dto)
    }

    /// Hydrate every row, in order. The first failure fails the whole batch.
    pub fn hydrate_all<T: Dto>(
        &self,
        rows: &[Row],
        rsm: Option<&ResultSetMapping<T>>,
    ) -> OrmResult<Vec<T>> {
        rows.iter().map(|row| self.hydrate(row, rsm)).collect()
    }

    fn assign<T: Dto>(&self, dto: &mut T, def: &FieldDef, raw: &Value) -> OrmResult<()> {
        let value = match def.ty {
            FieldType::Mixed | FieldType::Union(_) => raw.clone(),
            ty @ FieldType::Named { .. } => self
                .type_caster
                .cast(raw.clone(), &ty.descriptor())
                .map_err(|e| e.in_field(T::SHORT_NAME, def.name))?,
        };
        dto.set_field(def.name, value)
            .map_err(|e| e.in_field(T::SHORT_NAME, def.name))
    }
}

/// A stream of DTOs hydrated one row at a time from a [`RowStream`].
#[must_use = "streams do nothing unless polled"]
pub struct HydratingStream<T> {
    rows: RowStream,
    hydrator: Arc<Hydrator>,
    rsm: Option<ResultSetMapping<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Dto> HydratingStream<T> {
    pub fn new(rows: RowStream, hydrator: Arc<Hydrator>, rsm: Option<ResultSetMapping<T>>) -> Self {
        Self {
            rows,
            hydrator,
            rsm,
            _marker: PhantomData,
        }
    }
}

impl<T: Dto> Stream for HydratingStream<T> {
    type Item = OrmResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.rows).poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => {
                Poll::Ready(Some(self.hydrator.hydrate(&row, self.rsm.as_ref())))
            }
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
