/// Generates the lookups every domain client shares:
/// `get_<name>` (missing id is `NotFound`) and the crate-internal
/// `all_<name>s` used by the guarded listing methods.
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $error:ident, $entity_name_snake:ident) => {
        ::paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](&self, id: String) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.inner.get(id.clone()).await?.ok_or($error::NotFound(id))
                }

                #[tracing::instrument(skip(self))]
                pub(crate) async fn [<all_ $entity_name_snake s>](&self) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    Ok(self.inner.list_all().await?)
                }
            }
        }
    };
}
