use error_stack::Report;
use sqlx::PgConnection;
use uuid::Uuid;

use kernel::interface::query::PartnerQuery;
use kernel::interface::update::PartnerModifier;
use kernel::prelude::entity::{Archive, Partner, PartnerCity, PartnerId, PartnerName};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresPartnerRepository;

#[async_trait::async_trait]
impl PartnerQuery for PostgresPartnerRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &PartnerId,
    ) -> error_stack::Result<Option<Partner>, KernelError> {
        PgPartnerInternal::find_by_id(con.connection(), id).await
    }
}

#[async_trait::async_trait]
impl PartnerModifier for PostgresPartnerRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        partner: &Partner,
    ) -> error_stack::Result<(), KernelError> {
        PgPartnerInternal::create(con.connection(), partner).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        partner: &Partner,
    ) -> error_stack::Result<(), KernelError> {
        PgPartnerInternal::update(con.connection(), partner).await
    }
}

#[derive(sqlx::FromRow)]
struct PartnerRow {
    id: Uuid,
    name: String,
    city: Option<String>,
    active: bool,
}

impl From<PartnerRow> for Partner {
    fn from(value: PartnerRow) -> Self {
        let mut partner = Partner::new(
            PartnerId::new(value.id),
            PartnerName::new(value.name),
            value.city.map(PartnerCity::new),
        );
        partner.substitute(|partner| *partner.archive = Archive::new(value.active));
        partner
    }
}

pub(in crate::database) struct PgPartnerInternal;

impl PgPartnerInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &PartnerId,
    ) -> error_stack::Result<Option<Partner>, KernelError> {
        let id: &Uuid = id.as_ref();
        let row = sqlx::query_as::<_, PartnerRow>(
            // language=postgresql
            r#"
            SELECT id, name, city, active
            FROM partners
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Partner::from))
    }

    async fn create(con: &mut PgConnection, partner: &Partner) -> error_stack::Result<(), KernelError> {
        let id: &Uuid = partner.id().as_ref();
        let name: &String = partner.name().as_ref();
        let city: Option<&String> = partner.city().as_ref().map(|city| city.as_ref());
        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO partners (id, name, city, active)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(city)
        .bind(partner.archive().is_active())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(con: &mut PgConnection, partner: &Partner) -> error_stack::Result<(), KernelError> {
        let id: &Uuid = partner.id().as_ref();
        let name: &String = partner.name().as_ref();
        let city: Option<&String> = partner.city().as_ref().map(|city| city.as_ref());
        // language=postgresql
        let result = sqlx::query(
            r#"
            UPDATE partners
            SET name = $2, city = $3, active = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(city)
        .bind(partner.archive().is_active())
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("partner {:?}", partner.id())));
        }
        Ok(())
    }
}
