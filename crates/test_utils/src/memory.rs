//! In-memory implementations of the engine's store ports
//!
//! These fakes evaluate the same `Predicate` trees the SQL adapters render,
//! so engine tests exercise identical filter semantics without a database.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use core_kernel::{AccountId, ClientId, DateRange, FundName};
use rust_decimal::Decimal;

use domain_metrics::model::{CacheSnapshot, FactRow, HistoryPoint};
use domain_metrics::ports::{
    CacheStore, EntityBalance, FactStore, KpiCounts, StoreError,
};
use domain_metrics::predicate::Predicate;
use domain_metrics::Dimension;

/// Builder for an in-memory fact store.
///
/// Accounts must be linked to a client before facts reference them, matching
/// the invariant that the account-to-client link is established at account
/// creation. Tickers may be registered at any point before `build`.
#[derive(Debug, Default)]
pub struct MemoryFactStoreBuilder {
    links: HashMap<AccountId, (ClientId, String)>,
    tickers: HashMap<FundName, String>,
    facts: Vec<(AccountId, FundName, NaiveDate, Decimal)>,
}

impl MemoryFactStoreBuilder {
    /// Links an account to its client
    pub fn link(mut self, account: &str, client: &str, client_name: &str) -> Self {
        self.links.insert(
            AccountId::new(account).unwrap(),
            (ClientId::new(client).unwrap(), client_name.to_string()),
        );
        self
    }

    /// Registers a fund directory entry
    pub fn ticker(mut self, fund: &str, ticker: &str) -> Self {
        self.tickers
            .insert(FundName::new(fund).unwrap(), ticker.to_string());
        self
    }

    /// Adds a balance fact (`date` in `YYYY-MM-DD`)
    pub fn fact(mut self, account: &str, fund: &str, date: &str, balance: Decimal) -> Self {
        self.facts.push((
            AccountId::new(account).unwrap(),
            FundName::new(fund).unwrap(),
            core_kernel::parse_date(date).unwrap(),
            balance,
        ));
        self
    }

    pub fn build(self) -> MemoryFactStore {
        let rows = self
            .facts
            .into_iter()
            .map(|(account_id, fund_name, balance_date, balance)| {
                let (client_id, client_name) = self
                    .links
                    .get(&account_id)
                    .cloned()
                    .expect("account must be linked to a client before facts reference it");
                FactRow {
                    fund_ticker: self.tickers.get(&fund_name).cloned(),
                    account_id,
                    client_id,
                    client_name,
                    fund_name,
                    balance_date,
                    balance,
                }
            })
            .collect();
        MemoryFactStore { rows }
    }
}

/// An immutable in-memory fact store
#[derive(Debug, Default)]
pub struct MemoryFactStore {
    rows: Vec<FactRow>,
}

impl MemoryFactStore {
    pub fn builder() -> MemoryFactStoreBuilder {
        MemoryFactStoreBuilder::default()
    }

    /// A store with no facts at all
    pub fn empty() -> Self {
        Self::default()
    }

    fn matching_at<'a>(
        &'a self,
        predicate: &'a Predicate,
        date: NaiveDate,
    ) -> impl Iterator<Item = &'a FactRow> {
        self.rows
            .iter()
            .filter(move |row| row.balance_date == date && predicate.matches(row))
    }
}

fn group_key(dimension: Dimension, row: &FactRow) -> (String, Option<String>) {
    match dimension {
        Dimension::Client => (
            row.client_id.to_string(),
            Some(row.client_name.clone()),
        ),
        Dimension::Fund => (row.fund_name.to_string(), row.fund_ticker.clone()),
        Dimension::Account => (
            row.account_id.to_string(),
            Some(row.client_name.clone()),
        ),
    }
}

#[async_trait]
impl FactStore for MemoryFactStore {
    async fn latest_fact_date(&self) -> Result<Option<NaiveDate>, StoreError> {
        Ok(self.rows.iter().map(|row| row.balance_date).max())
    }

    async fn resolve_snapshot(
        &self,
        on_or_before: NaiveDate,
    ) -> Result<Option<NaiveDate>, StoreError> {
        Ok(self
            .rows
            .iter()
            .map(|row| row.balance_date)
            .filter(|date| *date <= on_or_before)
            .max())
    }

    async fn balances_at(
        &self,
        dimension: Dimension,
        predicate: &Predicate,
        date: NaiveDate,
    ) -> Result<Vec<EntityBalance>, StoreError> {
        let mut grouped: BTreeMap<String, (Option<String>, Decimal)> = BTreeMap::new();
        for row in self.matching_at(predicate, date) {
            let (key, label) = group_key(dimension, row);
            let entry = grouped.entry(key).or_insert((label, Decimal::ZERO));
            entry.1 += row.balance;
        }
        Ok(grouped
            .into_iter()
            .map(|(key, (label, balance))| EntityBalance {
                key,
                label,
                balance,
            })
            .collect())
    }

    async fn kpi_counts(
        &self,
        predicate: &Predicate,
        date: NaiveDate,
    ) -> Result<KpiCounts, StoreError> {
        let mut clients = BTreeSet::new();
        let mut funds = BTreeSet::new();
        let mut accounts = BTreeSet::new();
        let mut total_balance = Decimal::ZERO;
        for row in self.matching_at(predicate, date) {
            clients.insert(row.client_id.clone());
            funds.insert(row.fund_name.clone());
            accounts.insert(row.account_id.clone());
            total_balance += row.balance;
        }
        Ok(KpiCounts {
            clients: clients.len() as u64,
            funds: funds.len() as u64,
            accounts: accounts.len() as u64,
            total_balance,
        })
    }

    async fn history(
        &self,
        predicate: &Predicate,
        range: DateRange,
    ) -> Result<Vec<HistoryPoint>, StoreError> {
        let mut grouped: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for row in self
            .rows
            .iter()
            .filter(|row| range.contains(row.balance_date) && predicate.matches(row))
        {
            *grouped.entry(row.balance_date).or_insert(Decimal::ZERO) += row.balance;
        }
        Ok(grouped
            .into_iter()
            .map(|(date, balance)| HistoryPoint { date, balance })
            .collect())
    }

    async fn fact_rows(
        &self,
        predicate: &Predicate,
        date: NaiveDate,
    ) -> Result<Vec<FactRow>, StoreError> {
        let mut rows: Vec<FactRow> = self.matching_at(predicate, date).cloned().collect();
        rows.sort_by(|a, b| {
            (a.account_id.as_str(), a.fund_name.as_str())
                .cmp(&(b.account_id.as_str(), b.fund_name.as_str()))
        });
        Ok(rows)
    }

    async fn fact_row_count(
        &self,
        predicate: &Predicate,
        date: NaiveDate,
    ) -> Result<u64, StoreError> {
        Ok(self.matching_at(predicate, date).count() as u64)
    }
}

/// An in-memory cache store with optional failure injection
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    snapshots: RwLock<HashMap<NaiveDate, CacheSnapshot>>,
    fail_reads: bool,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose reads always fail, for exercising the gateway's
    /// fall-back-to-live behavior
    pub fn failing() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
            fail_reads: true,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.snapshots.read().unwrap().contains_key(&date)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, date: NaiveDate) -> Result<Option<CacheSnapshot>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::unavailable("cache store offline"));
        }
        Ok(self.snapshots.read().unwrap().get(&date).cloned())
    }

    async fn replace(&self, snapshot: &CacheSnapshot) -> Result<(), StoreError> {
        self.snapshots
            .write()
            .unwrap()
            .insert(snapshot.as_of_date, snapshot.clone());
        Ok(())
    }
}
