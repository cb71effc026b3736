//! Configurator session - One user's in-progress configuration of a product.
//!
//! Price lookups are asynchronous and a fast sequence of input changes can make their
//! responses arrive out of order. Every lookup therefore carries a [`RequestToken`];
//! a response is applied only if its token is the latest issued and the selection it
//! was computed for is still the current one. Anything else is discarded.
//!
//! Submission is a single sequential chain: validate, compute, persist. There is no
//! idempotency key, so submitting twice creates two quotes.

use crate::{
    config::pricing::PricingSettings,
    core::{
        catalog::{Catalog, get_catalog},
        discount::get_client_discount,
        events::EventBus,
        family::{Dimensions, ProductFamily},
        price_lookup::{PriceKey, PriceResult, lookup_price},
        pricing::{
            PriceBreakdown, PricingInputs, check_minimum_order, compute_total, money_from_f64,
        },
        quote::{QuoteDraft, get_quote, save_quote, update_quote},
        rehydrate::{FormState, rehydrate},
    },
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Identifies one price request; later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Issues monotonically increasing request tokens and remembers the latest.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    /// Issues a token that supersedes every earlier one.
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if no token has been issued after `token`.
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// Where a submission goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// Save as a new quote
    Create,
    /// Overwrite an existing unpaid quote
    Edit {
        /// Quote being overwritten
        quote_id: i64,
    },
}

/// State of one configurator screen.
#[derive(Debug)]
pub struct ConfiguratorSession {
    client_id: String,
    catalog: Catalog,
    form: FormState,
    mode: SubmitMode,
    discount_pct: Decimal,
    price: Option<(PriceKey, PriceResult)>,
    tracker: RequestTracker,
}

impl ConfiguratorSession {
    /// Builds a session from already-fetched parts.
    #[must_use]
    pub fn new(client_id: impl Into<String>, catalog: Catalog, discount_pct: Decimal) -> Self {
        let form = FormState::blank(&catalog);
        Self {
            client_id: client_id.into(),
            catalog,
            form,
            mode: SubmitMode::Create,
            discount_pct,
            price: None,
            tracker: RequestTracker::default(),
        }
    }

    /// Opens a blank configurator for `family`.
    ///
    /// Catalog and discount failures degrade to an empty catalog and no discount.
    pub async fn open(db: &DatabaseConnection, family: ProductFamily, client_id: &str) -> Self {
        let catalog = get_catalog(db, family).await;
        let discount_pct = get_client_discount(db, client_id).await;
        Self::new(client_id, catalog, discount_pct)
    }

    /// Reopens a stored quote for editing and looks up its current price.
    ///
    /// # Errors
    /// Returns `Error::QuoteNotFound` if the quote does not exist or belongs to another
    /// client, `Error::QuoteLocked` if it is paid, or an error if the price lookup fails.
    pub async fn open_for_edit(
        db: &DatabaseConnection,
        quote_id: i64,
        client_id: &str,
    ) -> Result<Self> {
        let quote = get_quote(db, quote_id)
            .await?
            .filter(|q| q.client_id == client_id)
            .ok_or(Error::QuoteNotFound { id: quote_id })?;
        if quote.paid {
            return Err(Error::QuoteLocked { id: quote_id });
        }

        let family: ProductFamily = quote.family.parse()?;
        let mut session = Self::open(db, family, client_id).await;
        session.form = rehydrate(family, &quote, &session.catalog);
        session.mode = SubmitMode::Edit { quote_id };
        session.refresh_price(db).await?;
        Ok(session)
    }

    /// Family being configured.
    #[must_use]
    pub const fn family(&self) -> ProductFamily {
        self.catalog.family
    }

    /// Options offered for the family.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current selection.
    #[must_use]
    pub const fn form(&self) -> &FormState {
        &self.form
    }

    /// Whether submitting creates a quote or updates one.
    #[must_use]
    pub const fn mode(&self) -> SubmitMode {
        self.mode
    }

    /// The client's discount percentage, fixed when the session opened.
    #[must_use]
    pub const fn discount_pct(&self) -> Decimal {
        self.discount_pct
    }

    /// Replaces the selected dimension pair.
    pub fn select_dimensions(&mut self, dimensions: Option<Dimensions>) {
        self.form.dimensions = dimensions;
    }

    /// Replaces the selected model id.
    pub fn select_model(&mut self, model_id: Option<i64>) {
        self.form.model_id = model_id;
    }

    /// Replaces the selected finish id.
    pub fn select_finish(&mut self, finish_id: Option<i64>) {
        self.form.finish_id = finish_id;
    }

    /// Sets an accessory quantity; negative requests become zero.
    pub fn set_quantity(&mut self, accessory_id: i64, requested: i64) -> bool {
        self.form.set_quantity(accessory_id, requested)
    }

    /// Starts a price request for the current selection.
    pub fn begin_price_request(&self) -> (RequestToken, PriceKey) {
        (self.tracker.issue(), self.form.price_key())
    }

    /// Applies a lookup response if it is still relevant.
    ///
    /// Returns false, leaving the session untouched, when a newer request has been
    /// issued or the selection changed since the request began.
    pub fn apply_price(&mut self, token: RequestToken, key: PriceKey, result: PriceResult) -> bool {
        if !self.tracker.is_current(token) || key != self.form.price_key() {
            debug!(?token, ?key, "Discarding stale price response");
            return false;
        }
        self.price = Some((key, result));
        true
    }

    /// Looks up the price of the current selection and applies it.
    ///
    /// # Errors
    /// Returns an error if the price table cannot be read.
    pub async fn refresh_price(&mut self, db: &DatabaseConnection) -> Result<bool> {
        let (token, key) = self.begin_price_request();
        let result = lookup_price(db, self.family(), &key).await?;
        Ok(self.apply_price(token, key, result))
    }

    /// The price of the current selection; `Unresolved` until a lookup for it completes.
    #[must_use]
    pub fn price(&self) -> PriceResult {
        match self.price {
            Some((key, result)) if key == self.form.price_key() => result,
            _ => PriceResult::Unresolved,
        }
    }

    fn finish_increment(&self) -> Option<Decimal> {
        let finish = self.catalog.finish_by_id(self.form.finish_id?)?;
        money_from_f64(finish.increment)
            .inspect_err(|e| {
                warn!(finish_id = finish.id, error = %e, "Unreadable finish increment");
            })
            .ok()
    }

    fn compute(&self, base: Decimal) -> PriceBreakdown {
        let lines = self.form.accessory_lines();
        compute_total(&PricingInputs {
            family: self.family(),
            base,
            finish_increment: self.finish_increment(),
            dimensions: self.form.dimensions,
            accessories: &lines,
            discount_pct: self.discount_pct,
        })
    }

    /// Totals for display, available once the price is resolved.
    #[must_use]
    pub fn breakdown(&self) -> Option<PriceBreakdown> {
        self.price().amount().map(|base| self.compute(base))
    }

    /// Checks the selection and returns the totals that would be saved.
    ///
    /// # Errors
    /// Returns `Error::MissingSelection` for a missing required choice,
    /// `Error::PriceUnresolved` when no price applies and unresolved prices are blocked,
    /// or `Error::BelowMinimumOrder` when the total is under the family minimum.
    pub fn validate(&self, settings: &PricingSettings) -> Result<PriceBreakdown> {
        let strategy = self.family().strategy();

        if strategy.requires_dimensions && self.form.dimensions.is_none() {
            return Err(Error::MissingSelection {
                field: "dimensions",
            });
        }
        // A selected id must still be offered by the catalog to count
        let model = self.form.model_id.and_then(|id| self.catalog.model_by_id(id));
        if strategy.requires_model && model.is_none() {
            return Err(Error::MissingSelection { field: "model" });
        }
        let finish = self.form.finish_id.and_then(|id| self.catalog.finish_by_id(id));
        if strategy.requires_finish && finish.is_none() {
            return Err(Error::MissingSelection { field: "finish" });
        }

        let base = match self.price().amount() {
            Some(base) => base,
            None if settings.block_unresolved_price => {
                return Err(Error::PriceUnresolved {
                    family: self.family().to_string(),
                });
            }
            None => Decimal::ZERO,
        };

        let breakdown = self.compute(base);
        let editing = matches!(self.mode, SubmitMode::Edit { .. });
        check_minimum_order(self.family(), breakdown.total, editing, settings)?;
        Ok(breakdown)
    }

    fn draft(&self, breakdown: PriceBreakdown) -> QuoteDraft {
        QuoteDraft {
            client_id: self.client_id.clone(),
            family: self.family(),
            dimensions: self.form.dimensions,
            model_name: self
                .form
                .model_id
                .and_then(|id| self.catalog.model_by_id(id))
                .map(|m| m.name.clone()),
            color: self
                .form
                .finish_id
                .and_then(|id| self.catalog.finish_by_id(id))
                .map(|f| f.name.clone()),
            accessories: self.form.accessory_lines(),
            breakdown,
        }
    }

    /// Validates, prices and saves the configuration, returning the quote id.
    ///
    /// # Errors
    /// Returns any validation error from [`Self::validate`], or the persister's errors.
    pub async fn submit(
        &self,
        db: &DatabaseConnection,
        settings: &PricingSettings,
        events: &EventBus,
    ) -> Result<i64> {
        let breakdown = self.validate(settings)?;
        let draft = self.draft(breakdown);

        match self.mode {
            SubmitMode::Create => save_quote(db, &draft, events).await,
            SubmitMode::Edit { quote_id } => {
                update_quote(db, quote_id, &draft, events).await?;
                info!(quote_id, "Quote resubmitted from editor");
                Ok(quote_id)
            }
        }
    }
}
