/// Generates the lookup methods every typed client shares: `get_<name>`
/// (missing documents become `NotFound`) and `find_<name>s`.
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        paste::paste! {
            #[allow(dead_code)]
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](&self, id: uuid::Uuid) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.inner
                        .get(id)
                        .await?
                        .ok_or_else(|| <$error>::NotFound(id.to_string()))
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<find_ $entity_name_snake s>](
                    &self,
                    query: crate::actor_framework::Query<$entity>,
                ) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    Ok(self.inner.find(query).await?)
                }
            }
        }
    };
}
