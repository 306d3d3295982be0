use async_trait::async_trait;
use serde_json::Value;

use signalcraft_client::ApiClient;
use signalcraft_core::{ManagedResource, ResourceKind};

use crate::adapter::{AdapterError, CreateOutcome, ResourceAdapter};
use crate::id_crud;
use crate::payload::PayloadBuilder;

const COLLECTION: &str = "/api/oncall/rotations";

pub struct ScheduleAdapter;

impl ScheduleAdapter {
    fn payload(resource: &ManagedResource) -> Result<Value, AdapterError> {
        Ok(PayloadBuilder::new()
            .field("name", resource.spec_str("name")?)
            .optional_from(resource, "description")
            .optional_from(resource, "timezone")
            .build())
    }
}

#[async_trait]
impl ResourceAdapter for ScheduleAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Schedule
    }

    async fn create(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<CreateOutcome, AdapterError> {
        id_crud::create_in(client, COLLECTION, &Self::payload(resource)?, resource).await
    }

    async fn update(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<(), AdapterError> {
        id_crud::update_in(client, COLLECTION, &Self::payload(resource)?, resource, self.kind())
            .await
    }

    async fn delete(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<(), AdapterError> {
        id_crud::delete_in(client, COLLECTION, resource).await
    }

    async fn read(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<Option<Value>, AdapterError> {
        id_crud::read_in(client, COLLECTION, resource).await
    }
}
