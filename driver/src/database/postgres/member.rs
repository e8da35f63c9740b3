use error_stack::Report;
use sqlx::PgConnection;
use time::Date;
use uuid::Uuid;

use kernel::interface::query::MemberQuery;
use kernel::interface::update::MemberModifier;
use kernel::prelude::entity::{Member, MemberId, MemberNumber, MembershipPeriod, PartnerId};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresMemberRepository;

#[async_trait::async_trait]
impl MemberQuery for PostgresMemberRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &MemberId,
    ) -> error_stack::Result<Option<Member>, KernelError> {
        PgMemberInternal::find_by_id(con.connection(), id).await
    }

    async fn find_by_number(
        &self,
        con: &mut PostgresTransaction,
        number: &MemberNumber,
    ) -> error_stack::Result<Option<Member>, KernelError> {
        PgMemberInternal::find_by_number(con.connection(), number).await
    }

    async fn find_by_partner(
        &self,
        con: &mut PostgresTransaction,
        partner: &PartnerId,
    ) -> error_stack::Result<Vec<Member>, KernelError> {
        PgMemberInternal::find_by_partner(con.connection(), partner).await
    }
}

#[async_trait::async_trait]
impl MemberModifier for PostgresMemberRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        member: &Member,
    ) -> error_stack::Result<(), KernelError> {
        PgMemberInternal::create(con.connection(), member).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        member: &Member,
    ) -> error_stack::Result<(), KernelError> {
        PgMemberInternal::update(con.connection(), member).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        member_id: &MemberId,
    ) -> error_stack::Result<(), KernelError> {
        PgMemberInternal::delete(con.connection(), member_id).await
    }
}

// language=postgresql
const SELECT_MEMBERS: &str = r#"
    SELECT id, partner_id, number, joined_on, left_on
    FROM members
    "#;

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    partner_id: Uuid,
    number: String,
    joined_on: Date,
    left_on: Option<Date>,
}

impl TryFrom<MemberRow> for Member {
    type Error = Report<KernelError>;
    fn try_from(value: MemberRow) -> Result<Self, Self::Error> {
        Ok(Member::new(
            MemberId::new(value.id),
            PartnerId::new(value.partner_id),
            MemberNumber::new(value.number),
            MembershipPeriod::new(value.joined_on, value.left_on)?,
        ))
    }
}

pub(in crate::database) struct PgMemberInternal;

impl PgMemberInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &MemberId,
    ) -> error_stack::Result<Option<Member>, KernelError> {
        let id: &Uuid = id.as_ref();
        let row = sqlx::query_as::<_, MemberRow>(&format!("{SELECT_MEMBERS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(con)
            .await
            .convert_error()?;
        row.map(Member::try_from).transpose()
    }

    async fn find_by_number(
        con: &mut PgConnection,
        number: &MemberNumber,
    ) -> error_stack::Result<Option<Member>, KernelError> {
        let number: &String = number.as_ref();
        let row = sqlx::query_as::<_, MemberRow>(&format!("{SELECT_MEMBERS} WHERE number = $1"))
            .bind(number)
            .fetch_optional(con)
            .await
            .convert_error()?;
        row.map(Member::try_from).transpose()
    }

    async fn find_by_partner(
        con: &mut PgConnection,
        partner: &PartnerId,
    ) -> error_stack::Result<Vec<Member>, KernelError> {
        let partner: &Uuid = partner.as_ref();
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "{SELECT_MEMBERS} WHERE partner_id = $1 ORDER BY joined_on"
        ))
        .bind(partner)
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(Member::try_from).collect()
    }

    async fn create(con: &mut PgConnection, member: &Member) -> error_stack::Result<(), KernelError> {
        let id: &Uuid = member.id().as_ref();
        let partner: &Uuid = member.partner().as_ref();
        let number: &String = member.number().as_ref();
        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO members (id, partner_id, number, joined_on, left_on)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(partner)
        .bind(number)
        .bind(member.period().joined_on())
        .bind(member.period().left_on())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(con: &mut PgConnection, member: &Member) -> error_stack::Result<(), KernelError> {
        let id: &Uuid = member.id().as_ref();
        let partner: &Uuid = member.partner().as_ref();
        let number: &String = member.number().as_ref();
        // language=postgresql
        let result = sqlx::query(
            r#"
            UPDATE members
            SET partner_id = $2, number = $3, joined_on = $4, left_on = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(partner)
        .bind(number)
        .bind(member.period().joined_on())
        .bind(member.period().left_on())
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("member {:?}", member.id())));
        }
        Ok(())
    }

    async fn delete(con: &mut PgConnection, member_id: &MemberId) -> error_stack::Result<(), KernelError> {
        let id: &Uuid = member_id.as_ref();
        // language=postgresql
        sqlx::query(
            r#"
            DELETE FROM members
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use uuid::Uuid;

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::{MemberQuery, PartnerQuery};
    use kernel::interface::update::{MemberModifier, PartnerModifier};
    use kernel::prelude::entity::{
        Member, MemberId, MemberNumber, MembershipPeriod, Partner, PartnerCity, PartnerId,
        PartnerName,
    };
    use kernel::KernelError;

    use crate::database::{PostgresDatabase, PostgresMemberRepository, PostgresPartnerRepository};

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let mut con = db.transact().await?;

        let partner = Partner::new(
            PartnerId::new(Uuid::new_v4()),
            PartnerName::new("member"),
            Some(PartnerCity::new("Lyon")),
        );
        PostgresPartnerRepository.create(&mut con, &partner).await?;
        let found = PostgresPartnerRepository.find_by_id(&mut con, partner.id()).await?;
        assert_eq!(found, Some(partner.clone()));

        let member = Member::new(
            MemberId::new(Uuid::new_v4()),
            partner.id().clone(),
            MemberNumber::new(format!("M-{}", Uuid::new_v4())),
            MembershipPeriod::new(date!(2024 - 01 - 01), None)?,
        );
        PostgresMemberRepository.create(&mut con, &member).await?;
        let found = PostgresMemberRepository
            .find_by_number(&mut con, member.number())
            .await?;
        assert_eq!(found, Some(member.clone()));
        let by_partner = PostgresMemberRepository
            .find_by_partner(&mut con, partner.id())
            .await?;
        assert_eq!(by_partner, vec![member.clone()]);

        PostgresMemberRepository.delete(&mut con, member.id()).await?;
        let found = PostgresMemberRepository.find_by_id(&mut con, member.id()).await?;
        assert!(found.is_none());

        con.roll_back().await?;
        Ok(())
    }
}
