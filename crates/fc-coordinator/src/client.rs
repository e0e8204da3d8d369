//! Forum client
//!
//! [`create_client`] wires a [`NormalizedCache`] with the pagination
//! resolvers and mutation updaters described by a [`ClientConfig`]. The
//! returned [`Client`] owns its cache; there is no shared or global state.

use crate::config::{ClientConfig, FetchOptions, RenderContext};
use crate::error::{ClientResult, ConfigError};
use crate::mutation::{Mutation, MutationName};
use crate::pagination::{CursorPagination, PaginatedResult, Resolution};
use crate::updaters::{apply_updates, SkipReason, UpdateOutcome};
use fc_store::{Cache, EntityKey, NormalizedCache, QueryDocument};
use serde_json::{Map, Value};

const HAS_MORE: &str = "hasMore";
const TYPENAME: &str = "__typename";

/// Result of reading a query from the cache
#[derive(Debug, Clone, PartialEq)]
pub enum QueryRead {
    /// Not answerable from the cache; fetch from the network
    Miss,
    /// Answered from the cache
    Hit {
        /// Query data
        data: Value,
        /// Some requested page is missing; show `data` and refetch
        partial: bool,
    },
}

impl QueryRead {
    /// Data of a hit
    #[inline]
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Hit { data, .. } => Some(data),
            Self::Miss => None,
        }
    }
}

/// Client cache coordinator
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    fetch_options: FetchOptions,
    resolvers: Vec<CursorPagination>,
    cache: NormalizedCache,
}

/// Create a client for `config` running in `context`
///
/// # Errors
/// Returns error if the configuration is invalid
pub fn create_client(config: &ClientConfig, context: &RenderContext) -> Result<Client, ConfigError> {
    config.validate()?;

    let client = Client {
        fetch_options: FetchOptions::new(config, context),
        resolvers: config
            .paginated_fields
            .iter()
            .cloned()
            .map(CursorPagination::new)
            .collect(),
        cache: NormalizedCache::with_keying(config.keying()),
        config: config.clone(),
    };

    tracing::info!(
        url = %config.api_url,
        server = context.is_server(),
        paginated = client.resolvers.len(),
        "client created"
    );
    Ok(client)
}

impl Client {
    /// Client configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Options for the network layer
    #[inline]
    #[must_use]
    pub fn fetch_options(&self) -> &FetchOptions {
        &self.fetch_options
    }

    /// The normalized cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &NormalizedCache {
        &self.cache
    }

    /// Mutable access to the normalized cache
    #[inline]
    pub fn cache_mut(&mut self) -> &mut NormalizedCache {
        &mut self.cache
    }

    /// Record a query response
    ///
    /// # Errors
    /// Returns error if `data` does not match `document`
    pub fn write_result(&mut self, document: &QueryDocument, data: &Value) -> ClientResult<()> {
        self.cache.write_query(document, data)?;
        tracing::debug!(document = document.name(), "query result recorded");
        Ok(())
    }

    /// Answer `document` from the cache
    ///
    /// Paginated root fields are resolved by merging all cached pages;
    /// other fields must have been recorded with exactly the requested
    /// arguments.
    #[must_use]
    pub fn read(&self, document: &QueryDocument) -> QueryRead {
        let root = EntityKey::root();
        let mut data = Map::new();
        let mut partial = false;

        for field in document.fields() {
            let value = match self.resolver_for(&field.name) {
                Some(resolver) => match resolver.resolve(&self.cache, &root, &field.arguments) {
                    Resolution::Miss => None,
                    Resolution::Hit {
                        result,
                        partial: page_missing,
                    } => {
                        partial |= page_missing;
                        Some(self.paginated_to_json(&result))
                    }
                },
                None => self.cache.read_field(&root, &field.field_key()),
            };

            let Some(value) = value else {
                tracing::debug!(document = document.name(), field = %field.name, "cache miss");
                return QueryRead::Miss;
            };
            data.insert(field.name.clone(), value);
        }

        tracing::trace!(document = document.name(), partial, "cache hit");
        QueryRead::Hit {
            data: Value::Object(data),
            partial,
        }
    }

    /// Apply a mutation response to the cache
    ///
    /// Entities in `result` are normalized first, then the updater for `name`
    /// runs. Unknown names pass through; arguments that fail validation skip
    /// the updater. A payload that cannot be fully normalized is logged and
    /// the updater still runs.
    pub fn apply_mutation(&mut self, name: &str, variables: &Value, result: &Value) -> UpdateOutcome {
        if let Err(e) = self.cache.write_entities(result) {
            tracing::warn!(mutation = name, error = %e, "mutation payload not fully normalized");
        }

        let outcome = match name.parse::<MutationName>() {
            Err(_) => {
                tracing::debug!(mutation = name, "no cache policy, passing through");
                UpdateOutcome::PassThrough
            }
            Ok(name) => match Mutation::parse(name, variables) {
                Ok(mutation) => apply_updates(&mutation, result, &mut self.cache),
                Err(e) => {
                    tracing::warn!(mutation = %name, error = %e, "invalid mutation arguments, update skipped");
                    UpdateOutcome::Skipped(SkipReason::InvalidArguments)
                }
            },
        };

        if self.config.collect_garbage {
            self.cache.collect_garbage();
        }
        outcome
    }

    fn resolver_for(&self, field_name: &str) -> Option<&CursorPagination> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.config().field_name == field_name)
    }

    /// JSON of a merged page aggregate
    fn paginated_to_json(&self, result: &PaginatedResult) -> Value {
        let items: Vec<Value> = result
            .items
            .iter()
            .filter_map(|key| self.cache.read_entity(key))
            .collect();

        let mut object = Map::new();
        object.insert(TYPENAME.to_string(), Value::String(result.typename.clone()));
        object.insert(result.list_field.clone(), Value::Array(items));
        object.insert(HAS_MORE.to_string(), Value::Bool(result.has_more));
        Value::Object(object)
    }
}
