//! Predicate builder
//!
//! Turns a [`SearchRequest`] into a single conjunctive condition over
//! `properties`, plus the to-one joins the condition needs. Only
//! `property_types`, `property_areas` and `sale_infos` are ever joined, so
//! applying a predicate never multiplies rows. Detail filters become
//! correlated `EXISTS` sub-selects against `property_details`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sea_orm::sea_query::{Alias, Expr, Func, IntoCondition, LikeExpr, Query, SimpleExpr};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, Condition, JoinType, QueryFilter, QuerySelect, RelationTrait, Select};
use serde::{Deserialize, Serialize};

use crate::db::canonical_number;
use crate::db::models::{
    property, DefineDetailColumn, DefineDetailEntity, PropertyAreaColumn, PropertyAreaEntity,
    PropertyColumn, PropertyDetailColumn, PropertyDetailEntity, PropertyEntity,
    PropertyTypeColumn, PropertyTypeEntity, SaleInfoColumn, SaleInfoEntity,
};
use crate::search::request::{DetailFilter, DetailMatch, SearchRequest};

/// Escape character for every LIKE pattern built here
const LIKE_ESCAPE: char = '!';

/// How numeric detail filters compare the stored string values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericComparison {
    /// Plain string comparison of canonical forms. `"80" >= "700"` holds.
    #[default]
    Lexicographic,
    /// Cast stored values to NUMERIC before comparing
    Numeric,
}

/// Lookup tables a predicate may join
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lookup {
    Type,
    Area,
    Sale,
}

impl Lookup {
    fn relation(self) -> property::Relation {
        match self {
            Lookup::Type => property::Relation::PropertyType,
            Lookup::Area => property::Relation::PropertyArea,
            Lookup::Sale => property::Relation::SaleInfo,
        }
    }
}

/// Join strength. A required join drops properties without the lookup row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JoinKind {
    Optional,
    Required,
}

impl JoinKind {
    fn join_type(self) -> JoinType {
        match self {
            JoinKind::Optional => JoinType::LeftJoin,
            JoinKind::Required => JoinType::InnerJoin,
        }
    }
}

/// Filter condition over `properties` with the joins it references
#[derive(Debug, Clone)]
pub struct PropertyPredicate {
    condition: Condition,
    constraints: usize,
    joins: BTreeMap<Lookup, JoinKind>,
}

impl PropertyPredicate {
    /// Predicate matching every property
    pub fn match_all() -> Self {
        Self {
            condition: Condition::all(),
            constraints: 0,
            joins: BTreeMap::new(),
        }
    }

    pub fn and<C: IntoCondition>(mut self, condition: C) -> Self {
        self.condition = self.condition.add(condition.into_condition());
        self.constraints += 1;
        self
    }

    /// Record a join; a required join wins over an optional one
    pub fn join(mut self, lookup: Lookup, kind: JoinKind) -> Self {
        let entry = self.joins.entry(lookup).or_insert(kind);
        *entry = (*entry).max(kind);
        self
    }

    pub fn is_match_all(&self) -> bool {
        self.constraints == 0 && self.joins.is_empty()
    }

    pub fn join_kind(&self, lookup: Lookup) -> Option<JoinKind> {
        self.joins.get(&lookup).copied()
    }

    /// Attach joins and the filter to a select over properties
    pub fn apply(&self, select: Select<PropertyEntity>) -> Select<PropertyEntity> {
        let select = self.joins.iter().fold(select, |select, (lookup, kind)| {
            select.join(kind.join_type(), lookup.relation().def())
        });

        if self.constraints == 0 {
            select
        } else {
            select.filter(self.condition.clone())
        }
    }
}

impl Default for PropertyPredicate {
    fn default() -> Self {
        Self::match_all()
    }
}

/// Build the predicate for a request. `None` and an empty request both
/// yield [`PropertyPredicate::match_all`].
pub fn build_predicate(
    request: Option<&SearchRequest>,
    comparison: NumericComparison,
) -> PropertyPredicate {
    let mut predicate = PropertyPredicate::match_all();
    let Some(request) = request else {
        return predicate;
    };

    if let Some(keyword) = request.keyword() {
        predicate = predicate
            .join(Lookup::Type, JoinKind::Optional)
            .join(Lookup::Area, JoinKind::Optional)
            .join(Lookup::Sale, JoinKind::Optional)
            .and(keyword_condition(keyword));
    }

    if let Some(title) = request.title() {
        predicate = predicate.and(contains((PropertyEntity, PropertyColumn::Title), title));
    }
    if let Some(description) = request.description() {
        predicate = predicate.and(contains(
            (PropertyEntity, PropertyColumn::Description),
            description,
        ));
    }

    if let Some(ids) = request.type_ids() {
        predicate = predicate
            .join(Lookup::Type, JoinKind::Required)
            .and(PropertyTypeColumn::Id.is_in(ids.iter().copied()));
    }
    if let Some(ids) = request.area_ids() {
        predicate = predicate
            .join(Lookup::Area, JoinKind::Required)
            .and(PropertyAreaColumn::Id.is_in(ids.iter().copied()));
    }
    if let Some(ids) = request.sale_user_ids() {
        predicate = predicate
            .join(Lookup::Sale, JoinKind::Required)
            .and(SaleInfoColumn::UserId.is_in(ids.iter().copied()));
    }

    if let Some(flag) = request.is_public {
        predicate = predicate.and(PropertyColumn::IsPublic.eq(flag));
    }
    if let Some(flag) = request.is_for_rent {
        predicate = predicate.and(PropertyColumn::IsForRent.eq(flag));
    }

    if let Some(min) = request.min_price {
        predicate = predicate.and(PropertyColumn::Price.gte(min));
    }
    if let Some(max) = request.max_price {
        predicate = predicate.and(PropertyColumn::Price.lte(max));
    }

    let ranges = [
        (PropertyColumn::CreatedAt, request.created_from, request.created_to),
        (PropertyColumn::UpdatedAt, request.updated_from, request.updated_to),
    ];
    for (column, from, to) in ranges {
        if let Some(from) = from {
            predicate = predicate.and(column.gte(DateTimeWithTimeZone::from(from)));
        }
        if let Some(to) = to {
            predicate = predicate.and(column.lte(DateTimeWithTimeZone::from(to)));
        }
    }

    for filter in request.detail_filters() {
        if let Some(exists) = detail_exists(filter, comparison) {
            predicate = predicate.and(exists);
        }
    }

    predicate
}

/// Keyword match over the listing text and its joined lookups
fn keyword_condition(keyword: &str) -> Condition {
    Condition::any()
        .add(contains((PropertyEntity, PropertyColumn::Title), keyword))
        .add(contains((PropertyEntity, PropertyColumn::Description), keyword))
        .add(contains((PropertyTypeEntity, PropertyTypeColumn::Name), keyword))
        .add(contains((PropertyAreaEntity, PropertyAreaColumn::Name), keyword))
        .add(contains((PropertyAreaEntity, PropertyAreaColumn::Link), keyword))
        .add(contains((SaleInfoEntity, SaleInfoColumn::FullName), keyword))
        .add(contains((SaleInfoEntity, SaleInfoColumn::Phone), keyword))
}

/// Case-insensitive substring match with LIKE wildcards in `needle` escaped
fn contains<C>(column: C, needle: &str) -> SimpleExpr
where
    C: sea_orm::sea_query::IntoColumnRef,
{
    Expr::expr(Func::lower(Expr::col(column))).like(like_pattern(needle))
}

fn like_pattern(needle: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

/// `EXISTS` over the property's value row for the filter's definition.
/// `None` when the filter carries no usable comparison.
fn detail_exists(filter: &DetailFilter, comparison: NumericComparison) -> Option<SimpleExpr> {
    let matched = filter.match_mode()?;

    let mut sub = Query::select();
    sub.expr(Expr::val(1))
        .from(PropertyDetailEntity)
        .inner_join(
            DefineDetailEntity,
            Expr::col((DefineDetailEntity, DefineDetailColumn::Id))
                .equals((PropertyDetailEntity, PropertyDetailColumn::DefineDetailId)),
        )
        .and_where(
            Expr::col((PropertyDetailEntity, PropertyDetailColumn::PropertyId))
                .equals((PropertyEntity, PropertyColumn::Id)),
        )
        .and_where(Expr::col((PropertyDetailEntity, PropertyDetailColumn::DefineDetailId)).eq(filter.id));

    let is_number = Expr::col((DefineDetailEntity, DefineDetailColumn::IsNumber));
    match matched {
        DetailMatch::Exact(number) => {
            sub.and_where(is_number.eq(true))
                .and_where(stored_number(comparison).eq(number_literal(&number, comparison)));
        }
        DetailMatch::Range { min, max } => {
            sub.and_where(is_number.eq(true));
            if let Some(min) = min {
                sub.and_where(stored_number(comparison).gte(number_literal(&min, comparison)));
            }
            if let Some(max) = max {
                sub.and_where(stored_number(comparison).lte(number_literal(&max, comparison)));
            }
        }
        DetailMatch::Text(text) => {
            sub.and_where(is_number.eq(false)).and_where(contains(
                (PropertyDetailEntity, PropertyDetailColumn::Value),
                text,
            ));
        }
    }

    Some(Expr::exists(sub.to_owned()))
}

/// Left-hand side of a numeric comparison on the stored value
fn stored_number(comparison: NumericComparison) -> Expr {
    let value = Expr::col((PropertyDetailEntity, PropertyDetailColumn::Value));
    match comparison {
        NumericComparison::Lexicographic => value,
        // Guarded so text values never reach the cast
        NumericComparison::Numeric => Expr::expr(Expr::case(
            Expr::col((DefineDetailEntity, DefineDetailColumn::IsNumber)).eq(true),
            Func::cast_as(value, Alias::new("NUMERIC")),
        )),
    }
}

fn number_literal(number: &Decimal, comparison: NumericComparison) -> SimpleExpr {
    let canonical = canonical_number(number);
    match comparison {
        NumericComparison::Lexicographic => Expr::val(canonical).into(),
        NumericComparison::Numeric => Func::cast_as(Expr::val(canonical), Alias::new("NUMERIC")).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{self, dec, PropertySeed};
    use chrono::Utc;
    use sea_orm::{DbBackend, EntityTrait, QueryOrder, QueryTrait};

    fn render(predicate: &PropertyPredicate) -> String {
        predicate
            .apply(PropertyEntity::find())
            .build(DbBackend::Postgres)
            .to_string()
    }

    async fn matching_titles(
        db: &sea_orm::DatabaseConnection,
        request: &SearchRequest,
        comparison: NumericComparison,
    ) -> Vec<String> {
        build_predicate(Some(request), comparison)
            .apply(PropertyEntity::find())
            .order_by_asc(PropertyColumn::Id)
            .all(db)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect()
    }

    #[test]
    fn test_empty_and_missing_request_match_all() {
        let none = build_predicate(None, NumericComparison::default());
        let empty = build_predicate(Some(&SearchRequest::default()), NumericComparison::default());
        assert!(none.is_match_all());
        assert!(empty.is_match_all());
        assert_eq!(render(&none), render(&empty));
        assert!(!render(&empty).contains("WHERE"));
    }

    #[test]
    fn test_blank_values_add_nothing() {
        let request = SearchRequest {
            q: Some("  ".into()),
            title: Some("".into()),
            type_ids: Some(vec![]),
            details: Some(vec![DetailFilter { id: 3, ..DetailFilter::default() }]),
            ..SearchRequest::default()
        };
        assert!(build_predicate(Some(&request), NumericComparison::default()).is_match_all());
    }

    #[test]
    fn test_keyword_uses_optional_joins() {
        let request = SearchRequest { q: Some("Vinhome".into()), ..SearchRequest::default() };
        let predicate = build_predicate(Some(&request), NumericComparison::default());
        assert_eq!(predicate.join_kind(Lookup::Type), Some(JoinKind::Optional));
        assert_eq!(predicate.join_kind(Lookup::Sale), Some(JoinKind::Optional));

        let sql = render(&predicate);
        assert!(sql.contains(r#"LEFT JOIN "property_types""#));
        assert!(sql.contains(r#"LEFT JOIN "property_areas""#));
        assert!(sql.contains(r#"LEFT JOIN "sale_infos""#));
        assert!(sql.contains("'%vinhome%'"));
        assert!(sql.contains(" OR "));
    }

    #[test]
    fn test_set_filter_requires_join() {
        let request = SearchRequest {
            q: Some("central".into()),
            type_ids: Some(vec![1, 2]),
            ..SearchRequest::default()
        };
        let predicate = build_predicate(Some(&request), NumericComparison::default());
        assert_eq!(predicate.join_kind(Lookup::Type), Some(JoinKind::Required));
        assert_eq!(predicate.join_kind(Lookup::Area), Some(JoinKind::Optional));

        let sql = render(&predicate);
        assert!(sql.contains(r#"INNER JOIN "property_types""#));
        assert!(!sql.contains(r#"LEFT JOIN "property_types""#));
        assert!(sql.contains(r#""property_types"."id" IN (1, 2)"#));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let request = SearchRequest { title: Some("100%_sure!".into()), ..SearchRequest::default() };
        let sql = render(&build_predicate(Some(&request), NumericComparison::default()));
        assert!(sql.contains("'%100!%!_sure!!%'"));
        assert!(sql.contains("ESCAPE '!'"));
    }

    #[test]
    fn test_detail_filter_renders_exists() {
        let request = SearchRequest {
            details: Some(vec![DetailFilter::range(7, Some(dec("70")), None)]),
            ..SearchRequest::default()
        };

        let lexicographic = render(&build_predicate(Some(&request), NumericComparison::Lexicographic));
        assert!(lexicographic.contains("EXISTS"));
        assert!(lexicographic.contains(r#"SELECT 1 FROM "property_details""#));
        assert!(lexicographic.contains(r#""property_details"."property_id" = "properties"."id""#));
        assert!(lexicographic.contains(r#""property_details"."value" >= '70'"#));
        assert!(!lexicographic.contains("CAST"));

        let numeric = render(&build_predicate(Some(&request), NumericComparison::Numeric));
        assert!(numeric.contains("CASE WHEN"));
        assert!(numeric.contains("CAST("));
        assert!(numeric.contains("NUMERIC"));
    }

    #[tokio::test]
    async fn test_lexicographic_range_edge_case() {
        let pool = fixtures::pool().await;
        let db = pool.write();
        let area = fixtures::insert_definition(db, "Area", true).await;
        let small = fixtures::insert_property(db, PropertySeed::titled("Eighty")).await;
        let large = fixtures::insert_property(db, PropertySeed::titled("Seven hundred fifty")).await;
        fixtures::set_detail(db, small.id, area.id, "80").await;
        fixtures::set_detail(db, large.id, area.id, "750").await;

        let min_700 = SearchRequest {
            details: Some(vec![DetailFilter::range(area.id, Some(dec("700")), None)]),
            ..SearchRequest::default()
        };

        // "80" sorts after "700" as a string
        assert_eq!(
            matching_titles(db, &min_700, NumericComparison::Lexicographic).await,
            vec!["Eighty", "Seven hundred fifty"]
        );
        assert_eq!(
            matching_titles(db, &min_700, NumericComparison::Numeric).await,
            vec!["Seven hundred fifty"]
        );

        let band = SearchRequest {
            details: Some(vec![DetailFilter::range(area.id, Some(dec("70")), Some(dec("90")))]),
            ..SearchRequest::default()
        };
        // "750" <= "90" as a string as well
        assert_eq!(
            matching_titles(db, &band, NumericComparison::Lexicographic).await,
            vec!["Eighty", "Seven hundred fifty"]
        );
        assert_eq!(
            matching_titles(db, &band, NumericComparison::Numeric).await,
            vec!["Eighty"]
        );
    }

    #[tokio::test]
    async fn test_exact_number_uses_canonical_form() {
        let pool = fixtures::pool().await;
        let db = pool.write();
        let bedrooms = fixtures::insert_definition(db, "Bedrooms", true).await;
        let two = fixtures::insert_property(db, PropertySeed::titled("Two bedrooms")).await;
        let three = fixtures::insert_property(db, PropertySeed::titled("Three bedrooms")).await;
        fixtures::set_detail(db, two.id, bedrooms.id, "2").await;
        fixtures::set_detail(db, three.id, bedrooms.id, "3").await;

        for comparison in [NumericComparison::Lexicographic, NumericComparison::Numeric] {
            let request = SearchRequest {
                details: Some(vec![DetailFilter::exact(bedrooms.id, dec("2.00"))]),
                ..SearchRequest::default()
            };
            assert_eq!(matching_titles(db, &request, comparison).await, vec!["Two bedrooms"]);

            let none = SearchRequest {
                details: Some(vec![DetailFilter::exact(bedrooms.id, dec("4"))]),
                ..SearchRequest::default()
            };
            assert!(matching_titles(db, &none, comparison).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_text_filter_and_unknown_definition() {
        let pool = fixtures::pool().await;
        let db = pool.write();
        let view = fixtures::insert_definition(db, "View", false).await;
        let sea = fixtures::insert_property(db, PropertySeed::titled("Sea side")).await;
        let city = fixtures::insert_property(db, PropertySeed::titled("City side")).await;
        fixtures::set_detail(db, sea.id, view.id, "Ocean VIEW").await;
        fixtures::set_detail(db, city.id, view.id, "Skyline").await;

        let text = SearchRequest {
            details: Some(vec![DetailFilter::text(view.id, "ocean view")]),
            ..SearchRequest::default()
        };
        assert_eq!(
            matching_titles(db, &text, NumericComparison::default()).await,
            vec!["Sea side"]
        );

        let unknown = SearchRequest {
            details: Some(vec![DetailFilter::text(view.id + 100, "ocean")]),
            ..SearchRequest::default()
        };
        assert!(matching_titles(db, &unknown, NumericComparison::default()).await.is_empty());
    }

    #[tokio::test]
    async fn test_timestamp_and_flag_filters() {
        let pool = fixtures::pool().await;
        let db = pool.write();
        fixtures::insert_property(db, PropertySeed::titled("Old").created(fixtures::day(2))).await;
        fixtures::insert_property(
            db,
            PropertySeed::titled("New").created(fixtures::day(20)).public(false),
        )
        .await;

        let recent = SearchRequest {
            created_from: Some(fixtures::day(10).with_timezone(&Utc)),
            ..SearchRequest::default()
        };
        assert_eq!(matching_titles(db, &recent, NumericComparison::default()).await, vec!["New"]);

        let early_public = SearchRequest {
            created_to: Some(fixtures::day(10).with_timezone(&Utc)),
            is_public: Some(true),
            ..SearchRequest::default()
        };
        assert_eq!(
            matching_titles(db, &early_public, NumericComparison::default()).await,
            vec!["Old"]
        );
    }
}
