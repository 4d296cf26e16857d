//! Per-kind SQL compilers.

use super::parts::{DeleteParts, InsertParts, QueryState, SelectParts, UpdateParts};
use crate::connection::Driver;
use crate::error::{OrmError, OrmResult};

/// Renders one kind of statement.
pub trait SqlCompiler {
    fn compile(&self) -> OrmResult<String>;
}

/// Compile whatever statement `state` describes.
pub fn compile(state: &QueryState, driver: &Driver) -> OrmResult<String> {
    match state {
        QueryState::Select(parts) => SelectCompiler::new(parts, driver).compile(),
        QueryState::Insert(parts) => InsertCompiler::new(parts).compile(),
        QueryState::Update(parts) => UpdateCompiler::new(parts).compile(),
        QueryState::Delete(parts) => DeleteCompiler::new(parts).compile(),
        QueryState::Unset => Err(OrmError::logic(
            "No query type (select/insert/update/delete) has been specified",
        )),
    }
}

/// `SELECT ... FROM ...` with pagination chosen by driver.
pub struct SelectCompiler<'a> {
    parts: &'a SelectParts,
    driver: &'a Driver,
}

impl<'a> SelectCompiler<'a> {
    pub fn new(parts: &'a SelectParts, driver: &'a Driver) -> Self {
        Self { parts, driver }
    }
}

impl SqlCompiler for SelectCompiler<'_> {
    fn compile(&self) -> OrmResult<String> {
        let p = self.parts;
        let from = p
            .from
            .as_ref()
            .filter(|from| !from.table.is_empty())
            .ok_or_else(|| OrmError::logic("FROM clause is required for SELECT"))?;

        let mut sql = String::from("SELECT ");
        if p.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&p.columns.join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(&from.to_from_sql());

        for join in &p.joins {
            sql.push_str(&format!(
                " {} JOIN {} {} ON {}",
                join.kind.as_sql(),
                join.table,
                join.alias,
                join.condition
            ));
        }

        push_list(&mut sql, " WHERE ", &p.where_, " AND ");
        push_list(&mut sql, " GROUP BY ", &p.group_by, ", ");
        push_list(&mut sql, " HAVING ", &p.having, " AND ");
        push_list(&mut sql, " ORDER BY ", &p.order_by, ", ");

        // Drivers without LIMIT/OFFSET get no pagination at all.
        if let Some(limit) = p.max_results {
            if self.driver.supports_limit_offset() {
                sql.push_str(&format!(" LIMIT {limit}"));
                if p.first_result > 0 {
                    sql.push_str(&format!(" OFFSET {}", p.first_result));
                }
            }
        }

        Ok(sql)
    }
}

/// `INSERT INTO t (cols) VALUES (placeholders)`.
pub struct InsertCompiler<'a> {
    parts: &'a InsertParts,
}

impl<'a> InsertCompiler<'a> {
    pub fn new(parts: &'a InsertParts) -> Self {
        Self { parts }
    }
}

impl SqlCompiler for InsertCompiler<'_> {
    fn compile(&self) -> OrmResult<String> {
        let p = self.parts;
        if p.table.is_empty() || p.values.is_empty() {
            return Err(OrmError::logic("INSERT requires table and values"));
        }

        let columns: Vec<&str> = p.values.keys().map(String::as_str).collect();
        let placeholders: Vec<&str> = p.values.values().map(String::as_str).collect();

        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            p.table,
            columns.join(", "),
            placeholders.join(", ")
        ))
    }
}

/// `UPDATE t SET c = p, ... [WHERE ...]`.
pub struct UpdateCompiler<'a> {
    parts: &'a UpdateParts,
}

impl<'a> UpdateCompiler<'a> {
    pub fn new(parts: &'a UpdateParts) -> Self {
        Self { parts }
    }
}

impl SqlCompiler for UpdateCompiler<'_> {
    fn compile(&self) -> OrmResult<String> {
        let p = self.parts;
        if p.table.table.is_empty() || p.set.is_empty() {
            return Err(OrmError::logic("UPDATE requires table and set values"));
        }

        let assignments: Vec<String> = p
            .set
            .iter()
            .map(|(column, placeholder)| format!("{column} = {placeholder}"))
            .collect();

        let mut sql = format!("UPDATE {} SET {}", p.table.to_sql(), assignments.join(", "));
        push_list(&mut sql, " WHERE ", &p.where_, " AND ");
        Ok(sql)
    }
}

/// `DELETE FROM t [WHERE ...]`.
pub struct DeleteCompiler<'a> {
    parts: &'a DeleteParts,
}

impl<'a> DeleteCompiler<'a> {
    pub fn new(parts: &'a DeleteParts) -> Self {
        Self { parts }
    }
}

impl SqlCompiler for DeleteCompiler<'_> {
    fn compile(&self) -> OrmResult<String> {
        let p = self.parts;
        if p.table.table.is_empty() {
            return Err(OrmError::logic("DELETE requires table"));
        }

        let mut sql = format!("DELETE FROM {}", p.table.to_sql());
        push_list(&mut sql, " WHERE ", &p.where_, " AND ");
        Ok(sql)
    }
}

fn push_list(sql: &mut String, keyword: &str, items: &[String], separator: &str) {
    if !items.is_empty() {
        sql.push_str(keyword);
        sql.push_str(&items.join(separator));
    }
}
