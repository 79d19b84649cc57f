// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex;
use svw_adapters::{FakeAccountStore, FakePrompt, PromptCall};
use svw_core::ErrorKind;
use tempfile::TempDir;

const URL: &str = "https://svn.example.com/repo/trunk";
const REALM: &str = "<https://svn.example.com> Authentication Realm";

fn auth_error() -> ExecutionError {
    ExecutionError::from_exit(
        "update",
        1,
        String::new(),
        "svn: E170001: Authorization failed\n".to_string(),
    )
}

fn cred(user: &str, pass: &str) -> Credential {
    Credential::new(user, pass)
}

struct Harness {
    orchestrator: AuthOrchestrator<FakeAccountStore, FakePrompt>,
    accounts: FakeAccountStore,
    prompt: FakePrompt,
    cache: Arc<CredentialCache>,
    _dir: TempDir,
}

fn harness(accounts: FakeAccountStore, prompt: FakePrompt, policy: AuthPolicy) -> Harness {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(CredentialCache::new(dir.path().join("svn.simple")));
    let orchestrator =
        AuthOrchestrator::new(accounts.clone(), prompt.clone(), Arc::clone(&cache), policy);
    Harness { orchestrator, accounts, prompt, cache, _dir: dir }
}

fn stored(names: &[&str]) -> FakeAccountStore {
    FakeAccountStore::with_accounts(
        names.iter().map(|n| StoredAccount::new(*n, format!("{n}-pw"))).collect(),
    )
}

/// Runs the orchestrator with an operation that answers from `respond` and
/// records every credential it was handed.
async fn run_recording(
    h: &Harness,
    realm_url: Option<&str>,
    credential: Option<Credential>,
    respond: impl Fn(Option<&Credential>) -> Result<&'static str, ExecutionError>,
) -> (Result<&'static str, ExecutionError>, Vec<Option<Credential>>) {
    let seen = Mutex::new(Vec::new());
    let result = h
        .orchestrator
        .run(realm_url, credential, |c| {
            seen.lock().push(c.clone());
            let outcome = respond(c.as_ref());
            async move { outcome }
        })
        .await;
    (result, seen.into_inner())
}

#[tokio::test]
async fn two_accounts_then_three_prompts_is_five_attempts() {
    let prompt = FakePrompt::new().answer("p1", "x").answer("p2", "x").answer("p3", "x");
    let h = harness(stored(&["a", "b"]), prompt, AuthPolicy::default());

    let (result, seen) = run_recording(&h, Some(URL), None, |_| Err(auth_error())).await;

    let err = result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AuthorizationFailed);
    assert_eq!(
        seen,
        vec![
            Some(cred("a", "a-pw")),
            Some(cred("b", "b-pw")),
            Some(cred("p1", "x")),
            Some(cred("p2", "x")),
            Some(cred("p3", "x")),
        ]
    );

    let previous: Vec<_> =
        h.prompt.calls().into_iter().map(|c| c.previous_username.unwrap_or_default()).collect();
    assert_eq!(previous, vec!["b", "p1", "p2"]);
}

#[tokio::test]
async fn prompt_receives_realm_string() {
    let h = harness(FakeAccountStore::new(), FakePrompt::new(), AuthPolicy::default());
    let _ = run_recording(&h, Some(URL), Some(cred("u", "p")), |_| Err(auth_error())).await;

    assert_eq!(
        h.prompt.calls(),
        vec![PromptCall { realm: Some(REALM.to_string()), previous_username: Some("u".to_string()) }]
    );
}

#[tokio::test]
async fn non_auth_error_propagates_after_one_call() {
    let h = harness(stored(&["a", "b"]), FakePrompt::new().answer("p", "p"), AuthPolicy::default());

    let (result, seen) = run_recording(&h, Some(URL), None, |_| {
        Err(ExecutionError::new(ErrorKind::Timeout, "update"))
    })
    .await;

    assert_eq!(result.unwrap_err().kind, ErrorKind::Timeout);
    assert_eq!(seen.len(), 1);
    assert!(h.prompt.calls().is_empty());
}

#[yare::parameterized(
    declined = { FakePrompt::new().decline() },
    failed   = { FakePrompt::new().fail("no terminal") },
)]
#[test_macro(tokio::test)]
async fn prompt_cancel_returns_last_auth_error(prompt: FakePrompt) {
    let h = harness(FakeAccountStore::new(), prompt, AuthPolicy::default());

    let (result, seen) =
        run_recording(&h, Some(URL), Some(cred("u", "bad")), |_| Err(auth_error())).await;

    let err = result.unwrap_err();
    assert!(err.is_auth_failure());
    assert_eq!(err.argument, "update");
    assert_eq!(seen, vec![Some(cred("u", "bad"))]);
    assert_eq!(h.prompt.calls().len(), 1);
}

#[tokio::test]
async fn supplied_credential_goes_first_then_every_account() {
    let h = harness(stored(&["a", "b"]), FakePrompt::new(), AuthPolicy::default());

    let (_, seen) = run_recording(&h, None, Some(cred("me", "pw")), |_| Err(auth_error())).await;

    assert_eq!(seen, vec![Some(cred("me", "pw")), Some(cred("a", "a-pw")), Some(cred("b", "b-pw"))]);
}

#[tokio::test]
async fn success_on_second_account_saves_it() {
    let h = harness(stored(&["a", "b"]), FakePrompt::new(), AuthPolicy::default());

    let (result, seen) = run_recording(&h, Some(URL), None, |c| match c {
        Some(c) if c.username() == "b" => Ok("done"),
        _ => Err(auth_error()),
    })
    .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(seen.len(), 2);
    assert_eq!(h.cache.read(URL).await.unwrap(), Some(cred("b", "b-pw")));
}

#[tokio::test]
async fn prompted_credential_is_saved_on_success() {
    let h = harness(FakeAccountStore::new(), FakePrompt::new().answer("carol", "pw"), AuthPolicy::default());

    let (result, _) = run_recording(&h, Some(URL), None, |c| match c {
        Some(_) => Ok("ok"),
        None => Err(auth_error()),
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(h.cache.read(URL).await.unwrap(), Some(cred("carol", "pw")));
    assert_eq!(h.prompt.calls()[0].previous_username, None);
}

#[yare::parameterized(
    saving_disabled     = { AuthPolicy { save_credentials: false, ..AuthPolicy::default() }, Some(URL), "pw" },
    no_realm            = { AuthPolicy::default(), None, "pw" },
    incomplete_password = { AuthPolicy::default(), Some(URL), "" },
)]
#[test_macro(tokio::test)]
async fn success_without_save(policy: AuthPolicy, realm_url: Option<&str>, password: &str) {
    let h = harness(FakeAccountStore::new(), FakePrompt::new(), policy);

    let (result, _) = run_recording(&h, realm_url, Some(cred("dave", password)), |_| Ok("ok")).await;

    assert!(result.is_ok());
    assert!(h.cache.written().is_empty());
}

#[tokio::test]
async fn cache_write_failure_does_not_fail_success() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let cache = Arc::new(CredentialCache::new(blocker.join("svn.simple")));
    let orchestrator =
        AuthOrchestrator::new(FakeAccountStore::new(), FakePrompt::new(), cache, AuthPolicy::default());

    let result = orchestrator.run(Some(URL), Some(cred("u", "p")), |_| async { Ok(7) }).await;
    assert_eq!(result.unwrap(), 7);
}

#[tokio::test]
async fn preseeds_from_cache_without_credential_or_accounts() {
    let h = harness(FakeAccountStore::new(), FakePrompt::new(), AuthPolicy::default());
    h.cache.write("cached", "pw", URL).await.unwrap();

    let (result, seen) = run_recording(&h, Some(URL), None, |_| Ok("ok")).await;

    assert!(result.is_ok());
    assert_eq!(seen, vec![Some(cred("cached", "pw"))]);
}

#[tokio::test]
async fn accounts_outrank_cache_for_preseeding() {
    let h = harness(stored(&["a"]), FakePrompt::new(), AuthPolicy::default());
    h.cache.write("cached", "pw", URL).await.unwrap();

    let (_, seen) = run_recording(&h, Some(URL), None, |_| Ok("ok")).await;
    assert_eq!(seen, vec![Some(cred("a", "a-pw"))]);
}

#[tokio::test]
async fn account_load_failure_falls_back_to_prompt() {
    let h = harness(
        FakeAccountStore::failing("locked keychain"),
        FakePrompt::new().answer("erin", "pw"),
        AuthPolicy::default(),
    );

    let (result, seen) = run_recording(&h, None, None, |c| match c {
        Some(_) => Ok("ok"),
        None => Err(auth_error()),
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(seen, vec![None, Some(cred("erin", "pw"))]);
    assert_eq!(h.accounts.loads(), 1);
}

#[tokio::test]
async fn zero_prompt_attempts_stops_after_accounts() {
    let policy = AuthPolicy { prompt_attempts: 0, ..AuthPolicy::default() };
    let h = harness(stored(&["a"]), FakePrompt::new().answer("never", "used"), policy);

    let (result, seen) = run_recording(&h, None, None, |_| Err(auth_error())).await;

    assert!(result.unwrap_err().is_auth_failure());
    assert_eq!(seen.len(), 1);
    assert!(h.prompt.calls().is_empty());
}

#[tokio::test]
async fn first_try_success_loads_accounts_once_and_never_prompts() {
    let h = harness(stored(&["a"]), FakePrompt::new(), AuthPolicy::default());

    let (result, seen) = run_recording(&h, None, None, |_| Ok("fine")).await;

    assert_eq!(result.unwrap(), "fine");
    assert_eq!(seen.len(), 1);
    assert_eq!(h.accounts.loads(), 1);
    assert!(h.prompt.calls().is_empty());
}

#[test]
fn policy_follows_config() {
    let config = SvwConfig {
        prompt_attempts: 5,
        save_credentials: false,
        use_native_store: true,
        ..Default::default()
    };
    assert_eq!(
        AuthPolicy::from(&config),
        AuthPolicy { prompt_attempts: 5, save_credentials: false, stage_credentials: true }
    );
}

fn staging() -> AuthPolicy {
    AuthPolicy { stage_credentials: true, ..AuthPolicy::default() }
}

#[tokio::test]
async fn staged_credential_is_in_cache_while_the_attempt_runs() {
    let h = harness(stored(&["a", "b"]), FakePrompt::new(), staging());
    let cache = Arc::clone(&h.cache);
    let staged = Mutex::new(Vec::new());

    let result = h
        .orchestrator
        .run(Some(URL), None, |c| {
            let cache = Arc::clone(&cache);
            let staged = &staged;
            async move {
                let on_disk = cache.read(URL).await.unwrap();
                staged.lock().push(on_disk.clone());
                match c {
                    Some(c) if c.username() == "b" && on_disk.as_ref() == Some(&c) => Ok("ok"),
                    _ => Err(auth_error()),
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(staged.into_inner(), vec![Some(cred("a", "a-pw")), Some(cred("b", "b-pw"))]);
    assert_eq!(h.cache.read(URL).await.unwrap(), Some(cred("b", "b-pw")));
}

#[tokio::test]
async fn staged_credential_is_removed_when_every_attempt_fails() {
    let h = harness(stored(&["a"]), FakePrompt::new().answer("p", "x"), staging());

    let (result, seen) = run_recording(&h, Some(URL), None, |_| Err(auth_error())).await;

    assert!(result.unwrap_err().is_auth_failure());
    assert_eq!(seen.len(), 2);
    assert_eq!(h.cache.read(URL).await.unwrap(), None);
    assert!(h.cache.written().is_empty());
}

#[tokio::test]
async fn staged_credential_is_removed_after_success_when_saving_is_off() {
    let policy = AuthPolicy { save_credentials: false, ..staging() };
    let h = harness(FakeAccountStore::new(), FakePrompt::new(), policy);

    let (result, _) = run_recording(&h, Some(URL), Some(cred("u", "p")), |_| Ok("ok")).await;

    assert!(result.is_ok());
    assert_eq!(h.cache.read(URL).await.unwrap(), None);
}

#[tokio::test]
async fn staging_without_realm_makes_a_single_attempt() {
    let h = harness(stored(&["a", "b"]), FakePrompt::new().answer("p", "x"), staging());

    let (result, seen) = run_recording(&h, None, None, |_| Err(auth_error())).await;

    assert!(result.unwrap_err().is_auth_failure());
    assert_eq!(seen, vec![Some(cred("a", "a-pw"))]);
    assert!(h.prompt.calls().is_empty());
}
