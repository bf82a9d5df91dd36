use async_trait::async_trait;
use querybench_core::{Catalog, CatalogError, Query, QueryError};
use serde_json::{json, Value as JsonValue};
use sqlx::pool::PoolConnection;
use sqlx::types::Json;
use sqlx::{Connection, PgConnection, Postgres};

use super::source::PgSource;

/// Read-only queries over the insurance tables. Each runs inside its own
/// transaction on the connection handed in by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsuranceQuery {
    ListCustomers,
    ListPolicies,
    ListClaims,
    ListPayments,
    CountCustomers,
    CountPolicies,
    CountClaims,
    CountPayments,
    CustomerById,
    PolicyById,
    ClaimsByPolicy,
    PaymentsByClaim,
}

enum Plan {
    List(&'static str),
    Count(&'static str),
    /// Look up the lowest parent id, then fetch by it; `missing` when there is no parent.
    Lookup {
        first_id: &'static str,
        fetch: &'static str,
        missing: fn() -> JsonValue,
    },
}

impl InsuranceQuery {
    pub const ALL: [InsuranceQuery; 12] = [
        InsuranceQuery::ListCustomers,
        InsuranceQuery::ListPolicies,
        InsuranceQuery::ListClaims,
        InsuranceQuery::ListPayments,
        InsuranceQuery::CountCustomers,
        InsuranceQuery::CountPolicies,
        InsuranceQuery::CountClaims,
        InsuranceQuery::CountPayments,
        InsuranceQuery::CustomerById,
        InsuranceQuery::PolicyById,
        InsuranceQuery::ClaimsByPolicy,
        InsuranceQuery::PaymentsByClaim,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InsuranceQuery::ListCustomers => "list_customers",
            InsuranceQuery::ListPolicies => "list_policies",
            InsuranceQuery::ListClaims => "list_claims",
            InsuranceQuery::ListPayments => "list_payments",
            InsuranceQuery::CountCustomers => "count_customers",
            InsuranceQuery::CountPolicies => "count_policies",
            InsuranceQuery::CountClaims => "count_claims",
            InsuranceQuery::CountPayments => "count_payments",
            InsuranceQuery::CustomerById => "customer_by_id",
            InsuranceQuery::PolicyById => "policy_by_id",
            InsuranceQuery::ClaimsByPolicy => "claims_by_policy",
            InsuranceQuery::PaymentsByClaim => "payments_by_claim",
        }
    }

    fn plan(&self) -> Plan {
        match self {
            InsuranceQuery::ListCustomers => Plan::List(
                "SELECT COALESCE(json_agg(t), '[]'::json) FROM \
                 (SELECT id, full_name, email FROM customer ORDER BY id LIMIT 100) t",
            ),
            InsuranceQuery::ListPolicies => Plan::List(
                "SELECT COALESCE(json_agg(t), '[]'::json) FROM \
                 (SELECT id, policy_number, policy_type FROM insurance_policy ORDER BY id LIMIT 100) t",
            ),
            InsuranceQuery::ListClaims => Plan::List(
                "SELECT COALESCE(json_agg(t), '[]'::json) FROM \
                 (SELECT id, claim_date, amount FROM claim ORDER BY id LIMIT 100) t",
            ),
            InsuranceQuery::ListPayments => Plan::List(
                "SELECT COALESCE(json_agg(t), '[]'::json) FROM \
                 (SELECT id, date, amount FROM payment ORDER BY id LIMIT 100) t",
            ),
            InsuranceQuery::CountCustomers => Plan::Count("SELECT COUNT(*) FROM customer"),
            InsuranceQuery::CountPolicies => Plan::Count("SELECT COUNT(*) FROM insurance_policy"),
            InsuranceQuery::CountClaims => Plan::Count("SELECT COUNT(*) FROM claim"),
            InsuranceQuery::CountPayments => Plan::Count("SELECT COUNT(*) FROM payment"),
            InsuranceQuery::CustomerById => Plan::Lookup {
                first_id: "SELECT id FROM customer ORDER BY id LIMIT 1",
                fetch: "SELECT row_to_json(c) FROM customer c WHERE c.id = $1",
                missing: || JsonValue::Null,
            },
            InsuranceQuery::PolicyById => Plan::Lookup {
                first_id: "SELECT id FROM insurance_policy ORDER BY id LIMIT 1",
                fetch: "SELECT row_to_json(p) FROM insurance_policy p WHERE p.id = $1",
                missing: || JsonValue::Null,
            },
            InsuranceQuery::ClaimsByPolicy => Plan::Lookup {
                first_id: "SELECT id FROM insurance_policy ORDER BY id LIMIT 1",
                fetch: "SELECT COALESCE(json_agg(t), '[]'::json) FROM \
                        (SELECT id, claim_date, amount FROM claim WHERE policy_id = $1 ORDER BY id LIMIT 10) t",
                missing: || json!([]),
            },
            InsuranceQuery::PaymentsByClaim => Plan::Lookup {
                first_id: "SELECT id FROM claim ORDER BY id LIMIT 1",
                fetch: "SELECT COALESCE(json_agg(t), '[]'::json) FROM \
                        (SELECT id, date, amount FROM payment WHERE claim_id = $1 ORDER BY id LIMIT 10) t",
                missing: || json!([]),
            },
        }
    }
}

async fn execute_plan(conn: &mut PgConnection, plan: Plan) -> Result<JsonValue, sqlx::Error> {
    match plan {
        Plan::List(sql) => {
            let Json(rows): Json<JsonValue> = sqlx::query_scalar(sql).fetch_one(&mut *conn).await?;
            Ok(rows)
        }
        Plan::Count(sql) => {
            let n: i64 = sqlx::query_scalar(sql).fetch_one(&mut *conn).await?;
            Ok(json!(n))
        }
        Plan::Lookup { first_id, fetch, missing } => {
            let id: Option<i64> = sqlx::query_scalar(first_id).fetch_optional(&mut *conn).await?;
            let Some(id) = id else {
                return Ok(missing());
            };
            let row: Option<Json<JsonValue>> = sqlx::query_scalar(fetch)
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
            Ok(row.map(|Json(v)| v).unwrap_or_else(missing))
        }
    }
}

#[async_trait]
impl Query<PgSource> for InsuranceQuery {
    async fn run(&self, handle: &mut PoolConnection<Postgres>) -> Result<JsonValue, QueryError> {
        let mut tx = Connection::begin(&mut **handle)
            .await
            .map_err(QueryError::failed)?;
        let value = execute_plan(&mut *tx, self.plan())
            .await
            .map_err(QueryError::failed)?;
        tx.commit().await.map_err(QueryError::failed)?;
        Ok(value)
    }
}

/// The twelve insurance read queries, in round-robin order.
pub fn insurance_catalog() -> Result<Catalog<PgSource>, CatalogError> {
    let mut catalog = Catalog::new();
    for q in InsuranceQuery::ALL {
        catalog.register(q.name(), q)?;
    }
    Ok(catalog)
}
