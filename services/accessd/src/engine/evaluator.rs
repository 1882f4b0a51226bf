//! Read-through policy evaluation.
//!
//! # Purpose
//! Answers allow/deny for coarse `(role, class, action)` and fine
//! `(role, org, category, resource, action)` requests against the rules
//! currently in the store.
//!
//! # How it works
//! Every call expands each requested role through [`RoleGraph::ancestors`],
//! reads the permission rows that share the request's scope (the class for
//! API checks, the `(org, category)` pair for resource checks) and keeps only
//! rows granted to one of those ancestors. The enforcer gets one direct
//! `(role, ancestor)` link per ancestor, so inheritance never depends on how
//! deep the chain is or on grouping rows found in the store.
//! A batch loads each distinct scope once and shares one enforcer.
//!
//! # Key invariants
//! - No state survives a call; writes are visible to the next check.
//! - The in-process graph alone decides inheritance; stored `g` rows are
//!   never read here.
//! - A request naming a role outside the [`RoleGraph`] is an error, not a deny.
//! - A batch either yields one decision per request, in order, or an error.
use super::EngineResult;
use super::enforcer::build_enforcer;
use crate::store::RuleStore;
use casbin::{CoreApi, DefaultModel, Enforcer};
use lin_authz::{AuthzError, PolicyType, Role, RoleGraph, api_model, resource_model};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct Evaluator {
    kind: PolicyType,
    rules: Arc<dyn RuleStore>,
    graph: Arc<RoleGraph>,
}

impl Evaluator {
    /// Coarse evaluator over `p` rows.
    pub fn api(rules: Arc<dyn RuleStore>, graph: Arc<RoleGraph>) -> Self {
        Self {
            kind: PolicyType::Api,
            rules,
            graph,
        }
    }

    /// Fine evaluator over `p2` rows.
    pub fn resource(rules: Arc<dyn RuleStore>, graph: Arc<RoleGraph>) -> Self {
        Self {
            kind: PolicyType::Resource,
            rules,
            graph,
        }
    }

    fn layer(&self) -> &'static str {
        match self.kind {
            PolicyType::Resource => "resource",
            _ => "api",
        }
    }

    pub async fn enforce(&self, request: &[String]) -> EngineResult<bool> {
        let decisions = self.batch_enforce(&[request.to_vec()]).await?;
        Ok(decisions.first().copied().unwrap_or(false))
    }

    /// Evaluate `requests` against one snapshot of the store.
    ///
    /// # Errors
    /// - [`AuthzError::InvalidRule`] when a request has the wrong arity.
    /// - [`AuthzError::UnknownRole`] when any request names an unknown role.
    /// - Store or casbin failures. No partial results are returned.
    pub async fn batch_enforce(&self, requests: &[Vec<String>]) -> EngineResult<Vec<bool>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let mut scopes = BTreeSet::new();
        let mut subjects = BTreeSet::new();
        let mut links = BTreeSet::new();
        for request in requests {
            self.check_width(request)?;
            let role = Role::new(request[0].as_str());
            let chain = self.graph.ancestors(&role)?;
            for ancestor in chain.iter().skip(1) {
                links.insert(vec![role.to_string(), ancestor.to_string()]);
            }
            subjects.extend(chain.into_iter().map(|role| role.to_string()));
            scopes.insert(self.scope_of(request));
        }

        let mut policies = BTreeSet::new();
        for scope in &scopes {
            let rows = self.rules.list_rules(self.kind, 1, scope).await?;
            policies.extend(
                rows.into_iter()
                    .filter(|row| row.first().is_some_and(|sub| subjects.contains(sub))),
            );
        }
        tracing::debug!(
            layer = self.layer(),
            requests = requests.len(),
            scopes = scopes.len(),
            subjects = subjects.len(),
            candidates = policies.len(),
            "evaluating access"
        );

        let enforcer = build_enforcer(
            self.model().await?,
            policies.into_iter().collect(),
            links.into_iter().collect(),
        )
        .await?;
        let mut decisions = Vec::with_capacity(requests.len());
        for request in requests {
            decisions.push(self.decide(&enforcer, request)?);
        }

        for allowed in &decisions {
            let decision = if *allowed { "allow" } else { "deny" };
            metrics::counter!(
                "lin_access_decisions_total",
                "layer" => self.layer(),
                "decision" => decision
            )
            .increment(1);
        }
        Ok(decisions)
    }

    fn check_width(&self, request: &[String]) -> EngineResult<()> {
        // Empty columns are allowed here; they match nothing and deny.
        if request.len() != self.kind.arity() {
            return Err(AuthzError::InvalidRule(format!(
                "{} request expects {} columns, got {}",
                self.kind,
                self.kind.arity(),
                request.len()
            ))
            .into());
        }
        Ok(())
    }

    fn scope_of(&self, request: &[String]) -> Vec<String> {
        match self.kind {
            PolicyType::Resource => request[1..3].to_vec(),
            _ => request[1..2].to_vec(),
        }
    }

    async fn model(&self) -> casbin::Result<DefaultModel> {
        match self.kind {
            PolicyType::Resource => resource_model().await,
            _ => api_model().await,
        }
    }

    fn decide(&self, enforcer: &Enforcer, request: &[String]) -> EngineResult<bool> {
        let allowed = match request {
            [sub, obj, act] => enforcer.enforce((sub.as_str(), obj.as_str(), act.as_str()))?,
            [sub, dom, cat, obj, act] => enforcer.enforce((
                sub.as_str(),
                dom.as_str(),
                cat.as_str(),
                obj.as_str(),
                act.as_str(),
            ))?,
            _ => {
                return Err(AuthzError::InvalidRule(format!(
                    "unsupported request width {}",
                    request.len()
                ))
                .into());
            }
        };
        Ok(allowed)
    }
}
