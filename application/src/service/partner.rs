use error_stack::Report;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{BookQuery, DependOnBookQuery, DependOnPartnerQuery, PartnerQuery};
use kernel::interface::update::{DependOnPartnerModifier, PartnerModifier};
use kernel::prelude::entity::{Partner, PartnerCity, PartnerId, PartnerName};
use kernel::KernelError;

use crate::transfer::{
    ArchivePartnerDto, CreatePartnerDto, GetPartnerDto, PartnerDto, UpdatePartnerDto,
};

fn partner_not_found(id: &Uuid) -> Report<KernelError> {
    Report::new(KernelError::NotFound).attach_printable(format!("partner {id} does not exist"))
}

#[async_trait::async_trait]
pub trait GetPartnerService:
    'static + Sync + Send + DependOnPartnerQuery + DependOnBookQuery
{
    /// Loads the partner together with the books it published and the books
    /// it wrote, both in listing order.
    #[tracing::instrument(skip_all)]
    async fn get_partner(
        &self,
        dto: GetPartnerDto,
    ) -> error_stack::Result<Option<PartnerDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = PartnerId::new(dto.id);
        let Some(partner) = self.partner_query().find_by_id(&mut connection, &id).await? else {
            return Ok(None);
        };
        let published = self
            .book_query()
            .find_by_publisher(&mut connection, &id)
            .await?;
        let authored = self.book_query().find_by_author(&mut connection, &id).await?;

        Ok(Some(PartnerDto::new(partner, published, authored)))
    }
}

impl<T> GetPartnerService for T where T: DependOnPartnerQuery + DependOnBookQuery {}

#[async_trait::async_trait]
pub trait CreatePartnerService: 'static + Sync + Send + DependOnPartnerModifier {
    #[tracing::instrument(skip_all)]
    async fn create_partner(&self, dto: CreatePartnerDto) -> error_stack::Result<Uuid, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let uuid = Uuid::new_v4();
        let partner = Partner::new(
            PartnerId::new(uuid),
            PartnerName::new(dto.name),
            dto.city.map(PartnerCity::new),
        );
        self.partner_modifier()
            .create(&mut connection, &partner)
            .await?;
        connection.commit().await?;

        tracing::info!("created partner {uuid}");
        Ok(uuid)
    }
}

impl<T> CreatePartnerService for T where T: DependOnPartnerModifier {}

#[async_trait::async_trait]
pub trait UpdatePartnerService:
    'static + Sync + Send + DependOnPartnerQuery + DependOnPartnerModifier
{
    #[tracing::instrument(skip_all)]
    async fn update_partner(&self, dto: UpdatePartnerDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let mut partner = self
            .partner_query()
            .find_by_id(&mut connection, &PartnerId::new(dto.id))
            .await?
            .ok_or_else(|| partner_not_found(&dto.id))?;
        partner.substitute(|partner| {
            if let Some(name) = dto.name {
                *partner.name = PartnerName::new(name);
            }
            if let Some(city) = dto.city {
                *partner.city = city.map(PartnerCity::new);
            }
        });

        self.partner_modifier()
            .update(&mut connection, &partner)
            .await?;
        connection.commit().await?;
        Ok(())
    }
}

impl<T> UpdatePartnerService for T where T: DependOnPartnerQuery + DependOnPartnerModifier {}

#[async_trait::async_trait]
pub trait ArchivePartnerService:
    'static + Sync + Send + DependOnPartnerQuery + DependOnPartnerModifier
{
    /// Flips the archive flag and returns whether the partner is now active.
    #[tracing::instrument(skip_all)]
    async fn toggle_partner_archive(
        &self,
        dto: ArchivePartnerDto,
    ) -> error_stack::Result<bool, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let mut partner = self
            .partner_query()
            .find_by_id(&mut connection, &PartnerId::new(dto.id))
            .await?
            .ok_or_else(|| partner_not_found(&dto.id))?;
        partner.substitute(|partner| partner.archive.toggle());
        let active = partner.archive().is_active();

        self.partner_modifier()
            .update(&mut connection, &partner)
            .await?;
        connection.commit().await?;
        Ok(active)
    }
}

impl<T> ArchivePartnerService for T where T: DependOnPartnerQuery + DependOnPartnerModifier {}
