/// Generates the retried read methods every store client shares:
/// `fetch_<entity>(id)` and `fetch_all_<entity>s()`.
#[macro_export]
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $entity_name:literal, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<fetch_ $entity_name_snake>](
                    &self,
                    id: <$entity as $crate::actor_framework::Entity>::Id,
                ) -> Result<Option<$entity>, $crate::repository::StoreError> {
                    tracing::debug!("Sending request");
                    let inner = &self.inner;
                    let id = &id;
                    $crate::repository::retry_idempotent(
                        concat!("get_", $entity_name),
                        self.settings.max_attempts,
                        move || async move {
                            inner
                                .get(id.clone())
                                .await
                                .map_err(|e| $crate::clients::store_error($entity_name, concat!("get_", $entity_name), e))
                        },
                    )
                    .await
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<fetch_all_ $entity_name_snake s>](&self) -> Result<Vec<$entity>, $crate::repository::StoreError> {
                    tracing::debug!("Sending request");
                    let inner = &self.inner;
                    $crate::repository::retry_idempotent(
                        concat!("list_", $entity_name),
                        self.settings.max_attempts,
                        move || async move {
                            inner
                                .list()
                                .await
                                .map_err(|e| $crate::clients::store_error($entity_name, concat!("list_", $entity_name), e))
                        },
                    )
                    .await
                }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty) => {
        impl $client_name {
            /// Wraps a store handle, bounding every round trip by `settings.timeout`.
            pub fn new(
                inner: $crate::actor_framework::ResourceClient<$entity>,
                settings: $crate::config::StorageSettings,
            ) -> Self {
                Self {
                    inner: inner.with_timeout(settings.timeout),
                    settings,
                }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $entity_name:literal, $entity_name_snake:ident) => {
        $crate::impl_client_new!($client_name, $entity);
        $crate::impl_client_methods!($client_name, $entity, $entity_name, $entity_name_snake);
    };
}
