use error_stack::Report;
use uuid::Uuid;

use kernel::interface::clock::{Clock, DependOnClock};
use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{
    DependOnMemberQuery, DependOnPartnerQuery, MemberQuery, PartnerQuery,
};
use kernel::interface::update::{DependOnMemberModifier, MemberModifier};
use kernel::prelude::entity::{Member, MemberId, MemberNumber, MembershipPeriod, PartnerId};
use kernel::KernelError;

use crate::transfer::{CreateMemberDto, DeleteMemberDto, GetMemberDto, MemberDto};

#[async_trait::async_trait]
pub trait GetMemberService:
    'static + Sync + Send + DependOnClock + DependOnMemberQuery + DependOnPartnerQuery
{
    #[tracing::instrument(skip_all)]
    async fn get_member(&self, dto: GetMemberDto) -> error_stack::Result<Option<MemberDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = MemberId::new(dto.id);
        let Some(member) = self.member_query().find_by_id(&mut connection, &id).await? else {
            return Ok(None);
        };
        let partner = self
            .partner_query()
            .find_by_id(&mut connection, member.partner())
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::Internal)
                    .attach_printable(format!("member {} has no partner record", dto.id))
            })?;

        let profile = member.profile(&partner)?;
        Ok(Some(MemberDto::new(profile, self.clock().today())))
    }
}

impl<T> GetMemberService for T where T: DependOnClock + DependOnMemberQuery + DependOnPartnerQuery {}

#[async_trait::async_trait]
pub trait CreateMemberService:
    'static + Sync + Send + DependOnPartnerQuery + DependOnMemberModifier
{
    /// The partner must already exist; a member never carries its own
    /// identity fields.
    #[tracing::instrument(skip_all)]
    async fn create_member(&self, dto: CreateMemberDto) -> error_stack::Result<Uuid, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let partner = PartnerId::new(dto.partner);
        if self
            .partner_query()
            .find_by_id(&mut connection, &partner)
            .await?
            .is_none()
        {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("partner {} does not exist", dto.partner)));
        }

        let uuid = Uuid::new_v4();
        let member = Member::new(
            MemberId::new(uuid),
            partner,
            MemberNumber::new(dto.number),
            MembershipPeriod::new(dto.joined_on, dto.left_on)?,
        );
        self.member_modifier()
            .create(&mut connection, &member)
            .await?;
        connection.commit().await?;

        tracing::info!("created member {uuid}");
        Ok(uuid)
    }
}

impl<T> CreateMemberService for T where T: DependOnPartnerQuery + DependOnMemberModifier {}

#[async_trait::async_trait]
pub trait DeleteMemberService: 'static + Sync + Send + DependOnMemberModifier {
    #[tracing::instrument(skip_all)]
    async fn delete_member(&self, dto: DeleteMemberDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        self.member_modifier()
            .delete(&mut connection, &MemberId::new(dto.id))
            .await?;
        connection.commit().await?;
        Ok(())
    }
}

impl<T> DeleteMemberService for T where T: DependOnMemberModifier {}
