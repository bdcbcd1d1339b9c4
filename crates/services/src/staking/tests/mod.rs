// Path: crates/services/src/staking/tests/mod.rs
use super::*;
use crate::bank::LedgerBank;
use epochstake_api::state::StateAccess;
use epochstake_test_utils::fixtures::{
    account, consensus_params, create_validator_msg, delegate_msg, edit_validator_msg, ed25519_key,
    header, operator, redelegate_msg, secp256k1_key, stake, undelegate_msg,
};
use epochstake_test_utils::hooks::{CallLog, HookCall, RecordingHooks};
use epochstake_test_utils::randomness::TestRng;
use epochstake_test_utils::state::{FaultyState, MemoryState};
use epochstake_test_utils::{assert_err, assert_error_code, assert_ok};
use epochstake_types::app::{
    pools, AccountId, BondStatus, Coin, CommissionRates, Description, EpochAction,
    MsgCreateValidator, MsgDelegate, MsgDelegateResponse, MsgUndelegate, MsgUndelegateResponse,
    StakingEvent, Validator, FIRST_EPOCH, IMMEDIATE_EPOCH,
};
use epochstake_types::config::{EpochParams, StakingParams};
use epochstake_types::error::StateError;
use epochstake_types::keys::validator_power_index_key;
use parity_scale_codec::{Decode, Encode};

const T0: u64 = 1_700_000_000;
const EPOCH_LEN: u64 = 1000;
const BLOCK_TIME: u64 = 5;
const UNBONDING: u64 = 21 * 24 * 60 * 60;

struct Env {
    module: StakingModule,
    bank: Arc<LedgerBank>,
    state: MemoryState,
    calls: CallLog,
}

impl Env {
    fn new() -> Self {
        let calls = CallLog::default();
        let mut hooks = MultiStakingHooks::new();
        hooks.register(Arc::new(RecordingHooks::with_log("first", calls.clone())));
        hooks.register(Arc::new(RecordingHooks::with_log("second", calls.clone())));

        let config = StakingModuleConfig {
            staking: StakingParams::default(),
            epochs: EpochParams {
                epoch_length_blocks: EPOCH_LEN,
                expected_block_time_secs: BLOCK_TIME,
            },
        };
        let bank = Arc::new(LedgerBank::new());
        let module = StakingModule::new(config, bank.clone(), hooks);
        Self {
            module,
            bank,
            state: MemoryState::new(),
            calls,
        }
    }

    fn fund(&mut self, n: u8, amount: u128) {
        self.bank
            .mint(&mut self.state, &account(n), &stake(amount))
            .unwrap();
    }

    fn balance(&self, n: u8) -> u128 {
        self.bank.balance(&self.state, &account(n), "stake").unwrap()
    }

    fn pool(&self, name: &str) -> u128 {
        self.bank.module_balance(&self.state, name, "stake").unwrap()
    }

    fn queued(&self, epoch: u64) -> Vec<EpochAction> {
        self.module
            .keeper()
            .queue()
            .pending(&self.state, epoch)
            .unwrap()
            .into_iter()
            .map(|q| q.action)
            .collect()
    }

    fn validator(&self, n: u8) -> Option<Validator> {
        self.module
            .keeper()
            .get_validator(&self.state, &operator(n))
            .unwrap()
    }

    fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Registers `validators` with 100 stake each and applies `delegations`
    /// `(delegator, validator, amount)`, then executes the first epoch at
    /// height 1000.
    fn bootstrap(&mut self, validators: &[u8], delegations: &[(u8, u8, u128)]) {
        for &n in validators {
            self.fund(n, 1_000_000);
            let mut ctx = Context::new(&mut self.state, header(500, T0));
            self.module
                .msg_server()
                .create_validator(&mut ctx, create_validator_msg(n, stake(100)))
                .unwrap();
        }
        for &(d, v, amount) in delegations {
            self.fund(d, 1_000_000);
            let mut ctx = Context::new(&mut self.state, header(500, T0));
            self.module
                .msg_server()
                .delegate(&mut ctx, delegate_msg(d, v, stake(amount)))
                .unwrap();
        }
        let mut ctx = Context::new(&mut self.state, header(EPOCH_LEN, T0 + 2500));
        let report = self.module.executor().execute_epoch(&mut ctx).unwrap();
        assert_eq!(report.failed, 0);
    }

    fn set_status(&mut self, n: u8, status: BondStatus, unbonding_time: u64) {
        let keeper = self.module.keeper();
        let mut v = keeper.get_validator(&self.state, &operator(n)).unwrap().unwrap();
        let from = if v.is_bonded() {
            pools::BONDED_POOL
        } else {
            pools::NOT_BONDED_POOL
        };
        let to = if status == BondStatus::Bonded {
            pools::BONDED_POOL
        } else {
            pools::NOT_BONDED_POOL
        };
        if from != to {
            self.bank
                .send_coins_from_module_to_module(&mut self.state, from, to, &[stake(v.tokens)])
                .unwrap();
        }
        v.status = status;
        v.unbonding_time = unbonding_time;
        keeper.set_validator(&mut self.state, &v).unwrap();
    }
}

// --- CreateValidator ---

#[test]
fn test_create_validator_registers_escrows_and_queues() {
    let mut env = Env::new();
    env.fund(1, 1_000);
    let msg = create_validator_msg(1, stake(100));

    let mut ctx = Context::new(&mut env.state, header(1000, T0));
    assert_ok!(env.module.msg_server().create_validator(&mut ctx, msg.clone()));
    let events = ctx.take_events();

    assert_eq!(
        events,
        vec![
            StakingEvent::CreateValidator {
                validator: operator(1).to_string(),
                amount: stake(100),
            },
            StakingEvent::Message {
                module: "staking".into(),
                sender: account(1).to_string(),
            },
        ]
    );

    let v = env.validator(1).unwrap();
    assert_eq!(v.status, BondStatus::Unbonded);
    assert_eq!(v.tokens, 0);
    assert_eq!(v.commission.update_time, T0);
    assert_eq!(v.commission.rates, CommissionRates::new(1_000, 2_000, 100));
    assert_eq!(v.min_self_delegation, 1);

    let keeper = env.module.keeper();
    let by_cons = keeper
        .get_validator_by_cons_addr(&env.state, &ed25519_key(1).consensus_address())
        .unwrap();
    assert_eq!(by_cons.map(|v| v.operator_address), Some(operator(1)));
    assert!(env
        .state
        .get(&validator_power_index_key(0, &operator(1)))
        .unwrap()
        .is_some());

    assert_eq!(env.balance(1), 900);
    assert_eq!(env.pool(pools::EPOCH_TEMP_POOL), 100);
    assert_eq!(env.queued(FIRST_EPOCH), vec![EpochAction::CreateValidator(msg)]);

    assert_eq!(
        env.calls(),
        vec![
            HookCall::ValidatorCreated("first", operator(1)),
            HookCall::ValidatorCreated("second", operator(1)),
        ]
    );
}

#[test]
fn test_create_validator_wrong_denom_has_no_side_effects() {
    let mut env = Env::new();
    env.fund(1, 1_000);
    let before = env.state.clone();

    let mut ctx = Context::new(&mut env.state, header(1000, T0));
    let err = assert_err!(env
        .module
        .msg_server()
        .create_validator(&mut ctx, create_validator_msg(1, Coin::new("atom", 100))));
    assert_eq!(
        err,
        StakingError::BadDenom {
            got: "atom".into(),
            expected: "stake".into()
        }
    );
    assert!(ctx.events().is_empty());
    assert_eq!(env.state, before);
    assert!(env.calls().is_empty());
}

#[test]
fn test_create_validator_duplicate_operator_and_pubkey() {
    let mut env = Env::new();
    env.fund(1, 1_000);
    env.fund(2, 1_000);
    {
        let mut ctx = Context::new(&mut env.state, header(1000, T0));
        assert_ok!(env
            .module
            .msg_server()
            .create_validator(&mut ctx, create_validator_msg(1, stake(100))));
    }

    let mut same_operator = create_validator_msg(1, stake(100));
    same_operator.pubkey = ed25519_key(7);
    {
        let mut ctx = Context::new(&mut env.state, header(1001, T0));
        assert_eq!(
            env.module
                .msg_server()
                .create_validator(&mut ctx, same_operator),
            Err(StakingError::ValidatorOwnerExists)
        );
    }
    assert_eq!(env.balance(1), 900);
    assert_eq!(env.pool(pools::EPOCH_TEMP_POOL), 100);

    let mut same_key = create_validator_msg(2, stake(100));
    same_key.pubkey = ed25519_key(1);
    {
        let mut ctx = Context::new(&mut env.state, header(1001, T0));
        assert_error_code!(
            env.module.msg_server().create_validator(&mut ctx, same_key),
            "STAKING_VALIDATOR_PUBKEY_EXISTS"
        );
    }

    assert_eq!(env.queued(FIRST_EPOCH).len(), 1);
    assert_eq!(env.balance(2), 1_000);
    assert_eq!(env.pool(pools::EPOCH_TEMP_POOL), 100);
}

#[test]
fn test_create_validator_checks_pubkey_allow_list() {
    let mut env = Env::new();
    env.fund(1, 1_000);
    env.fund(2, 1_000);

    let mut ctx = Context::new(&mut env.state, header(1000, T0))
        .with_consensus_params(consensus_params(&["secp256k1"]));
    let err = assert_err!(env
        .module
        .msg_server()
        .create_validator(&mut ctx, create_validator_msg(1, stake(100))));
    assert_eq!(
        err,
        StakingError::PubKeyTypeNotSupported {
            got: "ed25519".into(),
            allowed: vec!["secp256k1".into()],
        }
    );

    let mut secp = create_validator_msg(2, stake(100));
    secp.pubkey = secp256k1_key(2);
    assert_ok!(env.module.msg_server().create_validator(&mut ctx, secp));
    assert!(env.validator(1).is_none());
    assert!(env.validator(2).is_some());
}

#[test]
fn test_create_validator_rejects_bad_commission_and_description() {
    let mut env = Env::new();
    env.fund(1, 1_000);
    let before = env.state.clone();
    let mut ctx = Context::new(&mut env.state, header(1000, T0));

    let mut msg = create_validator_msg(1, stake(100));
    msg.commission = CommissionRates::new(3_000, 2_000, 100);
    assert_eq!(
        env.module.msg_server().create_validator(&mut ctx, msg),
        Err(StakingError::CommissionGtMaxRate)
    );

    let mut msg = create_validator_msg(1, stake(100));
    msg.description = Description::new("m", "", "w".repeat(141), "", "");
    assert!(matches!(
        env.module.msg_server().create_validator(&mut ctx, msg),
        Err(StakingError::DescriptionLength {
            field: "website",
            ..
        })
    ));

    drop(ctx);
    assert_eq!(env.state, before);
}

#[test]
fn test_create_validator_failed_transfer_leaves_no_validator() {
    let mut env = Env::new();
    env.fund(1, 50);
    let before = env.state.clone();

    let mut ctx = Context::new(&mut env.state, header(1000, T0));
    let err = assert_err!(env
        .module
        .msg_server()
        .create_validator(&mut ctx, create_validator_msg(1, stake(100))));
    assert!(matches!(err, StakingError::Bank(_)));
    assert_eq!(err.category(), epochstake_types::error::ErrorCategory::Resource);
    assert!(ctx.events().is_empty());
    drop(ctx);

    assert_eq!(env.state, before);
    assert!(env.validator(1).is_none());
    assert!(env.queued(FIRST_EPOCH).is_empty());
}

#[test]
fn test_create_validator_bad_delegator_address_writes_nothing() {
    let mut env = Env::new();
    env.fund(1, 1_000);
    let before = env.state.clone();

    let mut msg = create_validator_msg(1, stake(100));
    msg.delegator_address = "not-an-address".into();
    let mut ctx = Context::new(&mut env.state, header(1000, T0));
    assert!(matches!(
        env.module.msg_server().create_validator(&mut ctx, msg),
        Err(StakingError::InvalidAddress(_))
    ));
    drop(ctx);
    assert_eq!(env.state, before);
}

#[test]
fn test_create_validator_rejects_third_party_funder() {
    let mut env = Env::new();
    env.fund(2, 1_000);
    let before = env.state.clone();

    let mut msg = create_validator_msg(1, stake(100));
    msg.delegator_address = account(2).to_string();
    let mut ctx = Context::new(&mut env.state, header(1000, T0));
    assert_eq!(
        env.module.msg_server().create_validator(&mut ctx, msg),
        Err(StakingError::BadValidatorAddr)
    );
    assert!(ctx.events().is_empty());
    drop(ctx);

    assert_eq!(env.state, before);
    assert!(env.calls().is_empty());
}

#[test]
fn test_service_call_rejects_third_party_funder() {
    let mut env = Env::new();
    env.fund(2, 1_000);

    let mut msg = create_validator_msg(1, stake(100));
    msg.delegator_address = account(2).to_string();
    msg.min_self_delegation = 50;
    let err = {
        let mut ctx = Context::new(&mut env.state, header(10, T0));
        assert_err!(env
            .module
            .handle_service_call(&mut ctx, "create_validator@v1", &msg.encode()))
    };
    assert_eq!(err, StakingError::BadValidatorAddr);
    assert_eq!(
        err.category(),
        epochstake_types::error::ErrorCategory::MalformedInput
    );

    assert!(env.validator(1).is_none());
    assert_eq!(env.balance(2), 1_000);
    assert!(env.queued(FIRST_EPOCH).is_empty());
}

// --- EditValidator ---

#[test]
fn test_edit_validator_is_queued_without_validation() {
    let mut env = Env::new();
    let mut ctx = Context::new(&mut env.state, header(10, T0));
    assert_ok!(env
        .module
        .msg_server()
        .edit_validator(&mut ctx, edit_validator_msg(42, "ghost")));
    assert_eq!(
        env.queued(FIRST_EPOCH),
        vec![EpochAction::EditValidator(edit_validator_msg(42, "ghost"))]
    );
}

#[test]
fn test_edit_validator_applies_at_the_boundary() {
    let mut env = Env::new();
    env.bootstrap(&[1], &[]);

    let mut renamed = edit_validator_msg(1, "renamed");
    renamed.commission_rate_bps = Some(1_050);
    let mut too_soon = edit_validator_msg(1, "[do-not-modify]");
    too_soon.commission_rate_bps = Some(1_100);
    {
        let mut ctx = Context::new(&mut env.state, header(1500, T0 + 5000));
        let server = env.module.msg_server();
        assert_ok!(server.edit_validator(&mut ctx, renamed));
        assert_ok!(server.edit_validator(&mut ctx, too_soon));
    }

    let exec_time = T0 + 2 * 86_400;
    let mut ctx = Context::new(&mut env.state, header(2000, exec_time));
    let report = env.module.executor().execute_epoch(&mut ctx).unwrap();
    assert_eq!((report.epoch, report.applied, report.failed), (2, 1, 1));
    assert!(ctx.events().contains(&StakingEvent::EpochActionFailed {
        kind: "edit_validator".into(),
        reason: StakingError::CommissionUpdateTime.to_string(),
    }));
    drop(ctx);

    let v = env.validator(1).unwrap();
    assert_eq!(v.description.moniker, "renamed");
    assert_eq!(v.description.identity, "");
    assert_eq!(v.commission.rates.rate_bps, 1_050);
    assert_eq!(v.commission.update_time, exec_time);
}

// --- Delegate ---

#[test]
fn test_delegate_escrows_and_queues() {
    let mut env = Env::new();
    env.fund(3, 500);
    let msg = delegate_msg(3, 1, stake(200));

    let mut ctx = Context::new(&mut env.state, header(10, T0));
    assert_ok!(env.module.msg_server().delegate(&mut ctx, msg.clone()));
    assert_eq!(
        ctx.events(),
        &[StakingEvent::DelegationQueued {
            validator: operator(1).to_string(),
            amount: stake(200),
            epoch: FIRST_EPOCH,
        }]
    );
    drop(ctx);

    assert_eq!(env.balance(3), 300);
    assert_eq!(env.pool(pools::EPOCH_TEMP_POOL), 200);
    assert_eq!(env.queued(FIRST_EPOCH), vec![EpochAction::Delegate(msg)]);
}

#[test]
fn test_delegate_wrong_denom_leaves_queue_unchanged() {
    let mut env = Env::new();
    env.fund(3, 500);
    let before = env.state.clone();

    let mut ctx = Context::new(&mut env.state, header(10, T0));
    let err = assert_err!(env
        .module
        .msg_server()
        .delegate(&mut ctx, delegate_msg(3, 1, Coin::new("atom", 10))));
    assert!(matches!(err, StakingError::BadDenom { .. }));
    drop(ctx);
    assert_eq!(env.state, before);
}

#[test]
fn test_delegate_transfer_failure_queues_nothing() {
    let mut env = Env::new();
    env.fund(3, 5);
    let mut ctx = Context::new(&mut env.state, header(10, T0));
    assert_error_code!(
        env.module
            .msg_server()
            .delegate(&mut ctx, delegate_msg(3, 1, stake(10))),
        "STAKING_BANK_ERROR"
    );
    drop(ctx);
    assert!(env.queued(FIRST_EPOCH).is_empty());
    assert_eq!(env.balance(3), 5);
}

// --- BeginRedelegate ---

#[test]
fn test_begin_redelegate_matches_direct_projection() {
    let mut env = Env::new();
    env.bootstrap(&[1, 2], &[(3, 1, 50)]);
    let msg = redelegate_msg(3, 1, 2, stake(20));
    let now = header(EPOCH_LEN, T0 + 2500);

    let mut ctx = Context::new(&mut env.state, now);
    let epochs = env.module.epochs();
    assert_eq!(epochs.next_epoch_height(&ctx), 2 * EPOCH_LEN);
    let next_time = epochs.next_epoch_time(&ctx);
    assert_eq!(next_time, T0 + 2500 + EPOCH_LEN * BLOCK_TIME);

    let resp = assert_ok!(env
        .module
        .msg_server()
        .begin_redelegate(&mut ctx, msg.clone()));

    let mut cache = ctx
        .cache_context()
        .with_block_height(2 * EPOCH_LEN)
        .with_block_time(next_time);
    let direct = env
        .module
        .keeper()
        .epoch_begin_redelegate(&mut cache.context(), &msg)
        .unwrap();
    assert_eq!(resp.completion_time, direct);
    // An unbonded source matures immediately.
    assert_eq!(resp.completion_time, next_time);
    drop(cache);
    drop(ctx);

    assert_eq!(env.validator(1).unwrap().tokens, 150);
    assert_eq!(env.validator(2).unwrap().tokens, 100);
    assert_eq!(env.queued(2), vec![EpochAction::BeginRedelegate(msg)]);
}

#[test]
fn test_begin_redelegate_completion_follows_source_status() {
    let mut env = Env::new();
    env.bootstrap(&[1, 2], &[(3, 1, 50)]);
    let next_time = T0 + 2500 + EPOCH_LEN * BLOCK_TIME;

    env.set_status(1, BondStatus::Bonded, 0);
    let mut ctx = Context::new(&mut env.state, header(EPOCH_LEN, T0 + 2500));
    let resp = assert_ok!(env
        .module
        .msg_server()
        .begin_redelegate(&mut ctx, redelegate_msg(3, 1, 2, stake(20))));
    assert_eq!(resp.completion_time, next_time + UNBONDING);
    drop(ctx);

    env.set_status(1, BondStatus::Unbonding, T0 + 99_999);
    let mut ctx = Context::new(&mut env.state, header(EPOCH_LEN, T0 + 2500));
    let resp = assert_ok!(env
        .module
        .msg_server()
        .begin_redelegate(&mut ctx, redelegate_msg(3, 1, 2, stake(20))));
    assert_eq!(resp.completion_time, T0 + 99_999);
}

#[test]
fn test_begin_redelegate_failure_still_appends_one_action() {
    let mut env = Env::new();
    env.bootstrap(&[1, 2], &[]);
    let mut ctx = Context::new(&mut env.state, header(EPOCH_LEN, T0 + 2500));
    let server = env.module.msg_server();

    assert_eq!(
        server.begin_redelegate(&mut ctx, redelegate_msg(3, 1, 2, stake(20))),
        Err(StakingError::NoDelegation)
    );
    let err = assert_err!(server.begin_redelegate(&mut ctx, redelegate_msg(1, 1, 1, stake(20))));
    assert_eq!(err, StakingError::SelfRedelegation);
    assert_eq!(
        err.category(),
        epochstake_types::error::ErrorCategory::Execution
    );
    drop(ctx);

    assert_eq!(env.queued(2).len(), 2);
}

#[test]
fn test_transitive_redelegation_is_rejected() {
    let mut env = Env::new();
    env.bootstrap(&[1, 2, 3], &[(4, 1, 50)]);
    env.set_status(1, BondStatus::Bonded, 0);

    let first_done = T0 + 2500 + EPOCH_LEN * BLOCK_TIME + UNBONDING;
    {
        let mut ctx = Context::new(&mut env.state, header(EPOCH_LEN, T0 + 2500));
        let resp = assert_ok!(env
            .module
            .msg_server()
            .begin_redelegate(&mut ctx, redelegate_msg(4, 1, 2, stake(20))));
        assert_eq!(resp.completion_time, first_done);
    }
    {
        let mut ctx = Context::new(&mut env.state, header(2 * EPOCH_LEN, T0 + 7500));
        let report = env.module.executor().execute_epoch(&mut ctx).unwrap();
        assert_eq!(report.applied, 1);
    }
    let red = env
        .module
        .keeper()
        .get_redelegation(&env.state, &account(4), &operator(1), &operator(2))
        .unwrap()
        .unwrap();
    assert_eq!(red.entries.len(), 1);
    assert_eq!(red.entries[0].completion_time, first_done);

    let mut ctx = Context::new(&mut env.state, header(2100, T0 + 8000));
    assert_eq!(
        env.module
            .msg_server()
            .begin_redelegate(&mut ctx, redelegate_msg(4, 2, 3, stake(10))),
        Err(StakingError::TransitiveRedelegation)
    );
    drop(ctx);
    assert_eq!(env.queued(3).len(), 1);
}

// --- Undelegate ---

#[test]
fn test_undelegate_uses_immediate_queue_regardless_of_epoch() {
    let mut env = Env::new();
    env.bootstrap(&[1], &[]);
    env.module.epochs().set_epoch_number(&mut env.state, 5).unwrap();
    let msg = undelegate_msg(1, 1, stake(30));

    let mut ctx = Context::new(&mut env.state, header(1200, T0 + 3500));
    let resp = assert_ok!(env.module.msg_server().undelegate(&mut ctx, msg.clone()));
    assert_eq!(
        resp.completion_time,
        T0 + 3500 + 800 * BLOCK_TIME + UNBONDING
    );
    drop(ctx);

    assert_eq!(env.queued(IMMEDIATE_EPOCH), vec![EpochAction::Undelegate(msg)]);
    assert!(env.queued(5).is_empty());
    assert_eq!(env.validator(1).unwrap().tokens, 100);
    assert!(env
        .module
        .keeper()
        .get_unbonding_delegation(&env.state, &account(1), &operator(1))
        .unwrap()
        .is_none());
}

#[test]
fn test_undelegate_failure_is_still_queued() {
    let mut env = Env::new();
    let mut ctx = Context::new(&mut env.state, header(10, T0));
    assert_eq!(
        env.module
            .msg_server()
            .undelegate(&mut ctx, undelegate_msg(1, 9, stake(5))),
        Err(StakingError::NoValidatorFound)
    );
    drop(ctx);
    assert_eq!(env.queued(IMMEDIATE_EPOCH).len(), 1);
}

// --- Epoch execution ---

#[test]
fn test_execute_epoch_bonds_escrow_and_advances() {
    let mut env = Env::new();
    env.bootstrap(&[1], &[(3, 1, 50)]);

    let v = env.validator(1).unwrap();
    assert_eq!((v.tokens, v.delegator_shares), (150, 150));
    let keeper = env.module.keeper();
    let del = keeper
        .get_delegation(&env.state, &account(3), &operator(1))
        .unwrap()
        .unwrap();
    assert_eq!(del.shares, 50);

    assert_eq!(env.pool(pools::EPOCH_TEMP_POOL), 0);
    assert_eq!(env.pool(pools::NOT_BONDED_POOL), 150);
    assert_eq!(env.module.epochs().current_epoch(&env.state).unwrap(), 2);
    assert!(env.queued(FIRST_EPOCH).is_empty());

    let modified: Vec<_> = env
        .calls()
        .into_iter()
        .filter(|c| matches!(c, HookCall::DelegationModified(..)))
        .collect();
    assert_eq!(modified.len(), 4);
}

#[test]
fn test_execute_epoch_drains_immediate_queue_first() {
    let mut env = Env::new();
    env.fund(1, 1_000);
    {
        let mut ctx = Context::new(&mut env.state, header(10, T0));
        let server = env.module.msg_server();
        assert_ok!(server.create_validator(&mut ctx, create_validator_msg(1, stake(100))));
        // Queued at 0, so it runs before the bond it depends on.
        assert_eq!(
            server.undelegate(&mut ctx, undelegate_msg(1, 1, stake(10))),
            Err(StakingError::NoDelegation)
        );
    }

    let mut ctx = Context::new(&mut env.state, header(EPOCH_LEN, T0 + 5000));
    let report = env.module.executor().execute_epoch(&mut ctx).unwrap();
    assert_eq!((report.applied, report.failed), (1, 1));
    let kinds: Vec<_> = ctx
        .events()
        .iter()
        .filter_map(|e| match e {
            StakingEvent::EpochActionFailed { kind, .. } => Some(kind.clone()),
            StakingEvent::Delegate { .. } => Some("applied".to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(kinds, vec!["undelegate".to_string(), "applied".to_string()]);
    drop(ctx);
    assert_eq!(env.validator(1).unwrap().tokens, 100);
}

#[test]
fn test_failed_delegation_is_refunded() -> anyhow::Result<()> {
    let mut env = Env::new();
    env.fund(3, 100);
    {
        let mut ctx = Context::new(&mut env.state, header(10, T0));
        env.module
            .msg_server()
            .delegate(&mut ctx, delegate_msg(3, 9, stake(40)))?;
    }
    assert_eq!(env.balance(3), 60);

    let mut ctx = Context::new(&mut env.state, header(EPOCH_LEN, T0 + 5000));
    let report = env.module.executor().execute_epoch(&mut ctx)?;
    assert_eq!((report.applied, report.failed), (0, 1));
    drop(ctx);

    assert_eq!(env.balance(3), 100);
    assert_eq!(env.pool(pools::EPOCH_TEMP_POOL), 0);
    Ok(())
}

#[test]
fn test_undelegate_below_min_self_delegation_jails() {
    let mut env = Env::new();
    env.fund(1, 1_000);
    {
        let mut msg = create_validator_msg(1, stake(100));
        msg.min_self_delegation = 50;
        let mut ctx = Context::new(&mut env.state, header(10, T0));
        assert_ok!(env.module.msg_server().create_validator(&mut ctx, msg));
    }
    {
        let mut ctx = Context::new(&mut env.state, header(EPOCH_LEN, T0 + 5000));
        env.module.executor().execute_epoch(&mut ctx).unwrap();
        let resp = env
            .module
            .msg_server()
            .undelegate(&mut ctx, undelegate_msg(1, 1, stake(60)))
            .unwrap();
        assert_eq!(resp.completion_time, T0 + 10_000 + UNBONDING);
    }

    let exec_time = T0 + 10_000;
    let mut ctx = Context::new(&mut env.state, header(2 * EPOCH_LEN, exec_time));
    let report = env.module.executor().execute_epoch(&mut ctx).unwrap();
    assert_eq!(report.applied, 1);
    drop(ctx);

    let v = env.validator(1).unwrap();
    assert!(v.jailed);
    assert_eq!(v.tokens, 40);
    let ubd = env
        .module
        .keeper()
        .get_unbonding_delegation(&env.state, &account(1), &operator(1))
        .unwrap()
        .unwrap();
    assert_eq!(ubd.entries.len(), 1);
    assert_eq!(ubd.entries[0].balance, 60);
    assert_eq!(ubd.entries[0].completion_time, exec_time + UNBONDING);
}

#[test]
fn test_execute_epoch_storage_fault_keeps_unapplied_actions() {
    let mut env = Env::new();
    env.fund(1, 1_000);
    env.fund(3, 1_000);
    let delegation = delegate_msg(3, 1, stake(50));
    {
        let mut ctx = Context::new(&mut env.state, header(10, T0));
        let server = env.module.msg_server();
        assert_ok!(server.create_validator(&mut ctx, create_validator_msg(1, stake(100))));
        assert_ok!(server.delegate(&mut ctx, delegation.clone()));
    }

    // One commit goes through; the second is refused.
    let mut faulty = FaultyState::new(env.state.clone(), 1);
    {
        let mut ctx = Context::new(&mut faulty, header(EPOCH_LEN, T0 + 5000));
        assert!(matches!(
            env.module.executor().execute_epoch(&mut ctx),
            Err(StakingError::State(StateError::Backend(_)))
        ));
    }
    env.state = faulty.into_inner();

    assert_eq!(env.validator(1).unwrap().tokens, 100);
    assert_eq!(env.queued(FIRST_EPOCH), vec![EpochAction::Delegate(delegation)]);
    assert_eq!(env.pool(pools::EPOCH_TEMP_POOL), 50);
    assert_eq!(
        env.module.epochs().current_epoch(&env.state).unwrap(),
        FIRST_EPOCH
    );

    let mut ctx = Context::new(&mut env.state, header(EPOCH_LEN, T0 + 5005));
    let report = env.module.executor().execute_epoch(&mut ctx).unwrap();
    assert_eq!((report.epoch, report.applied, report.failed), (FIRST_EPOCH, 1, 0));
    drop(ctx);

    assert_eq!(env.validator(1).unwrap().tokens, 150);
    assert_eq!(env.pool(pools::EPOCH_TEMP_POOL), 0);
    assert_eq!(env.module.epochs().current_epoch(&env.state).unwrap(), 2);
}

// --- Randomized ---

const CASES: usize = 24;

fn random_epoch(rng: &mut TestRng) -> u64 {
    rng.next_u64() % 10_000 + 1
}

fn random_create_msg(rng: &mut TestRng) -> MsgCreateValidator {
    let operator = rng.validator_address();
    let amount = rng.amount(1, 1_000_000_000_000);
    MsgCreateValidator {
        description: Description::new("random", "", "", "", ""),
        commission: CommissionRates::new(1_000, 2_000, 100),
        min_self_delegation: rng.amount(1, amount),
        delegator_address: AccountId::from(operator).to_string(),
        validator_address: operator.to_string(),
        pubkey: rng.ed25519_pubkey(),
        value: stake(amount),
    }
}

#[test]
fn test_random_create_validator_is_registered_and_queued_once() {
    let mut rng = TestRng::new(0x5eed_0001);
    for _ in 0..CASES {
        let mut env = Env::new();
        let epoch = random_epoch(&mut rng);
        env.module
            .epochs()
            .set_epoch_number(&mut env.state, epoch)
            .unwrap();
        let msg = random_create_msg(&mut rng);
        let (operator, funder) = msg.self_delegator().unwrap();
        let spare = rng.amount(0, 1_000);
        env.bank
            .mint(&mut env.state, &funder, &stake(msg.value.amount + spare))
            .unwrap();

        let height = rng.next_u64() % 1_000_000 + 1;
        {
            let mut ctx = Context::new(&mut env.state, header(height, T0));
            assert_ok!(env.module.msg_server().create_validator(&mut ctx, msg.clone()));
        }

        let keeper = env.module.keeper();
        let stored = keeper.get_validator(&env.state, &operator).unwrap().unwrap();
        assert_eq!(stored.min_self_delegation, msg.min_self_delegation);
        let by_cons = keeper
            .get_validator_by_cons_addr(&env.state, &msg.pubkey.consensus_address())
            .unwrap();
        assert_eq!(by_cons.map(|v| v.operator_address), Some(operator));

        assert_eq!(env.queued(epoch), vec![EpochAction::CreateValidator(msg.clone())]);
        assert!(env.queued(IMMEDIATE_EPOCH).is_empty());
        assert_eq!(
            env.bank.balance(&env.state, &funder, "stake").unwrap(),
            spare
        );
        assert_eq!(env.pool(pools::EPOCH_TEMP_POOL), msg.value.amount);
    }
}

#[test]
fn test_random_delegate_wrong_denom_leaves_queue_unchanged() {
    let mut rng = TestRng::new(0x5eed_0002);
    let mut env = Env::new();
    for _ in 0..CASES {
        let epoch = random_epoch(&mut rng);
        env.module
            .epochs()
            .set_epoch_number(&mut env.state, epoch)
            .unwrap();
        let delegator = rng.account();
        let validator = rng.validator_address();
        let amount = rng.amount(1, 1_000_000);
        env.bank
            .mint(&mut env.state, &delegator, &stake(amount))
            .unwrap();

        let valid = MsgDelegate {
            delegator_address: delegator.to_string(),
            validator_address: validator.to_string(),
            amount: stake(amount / 2 + 1),
        };
        {
            let mut ctx = Context::new(&mut env.state, header(10, T0));
            assert_ok!(env.module.msg_server().delegate(&mut ctx, valid));
        }
        let before = env.state.clone();

        let denom = format!("coin{}", rng.next_u64() % 1_000);
        let wrong = MsgDelegate {
            delegator_address: delegator.to_string(),
            validator_address: validator.to_string(),
            amount: Coin::new(denom.clone(), rng.amount(1, amount)),
        };
        let mut ctx = Context::new(&mut env.state, header(11, T0));
        assert_eq!(
            env.module.msg_server().delegate(&mut ctx, wrong),
            Err(StakingError::BadDenom {
                got: denom,
                expected: "stake".into(),
            })
        );
        assert!(ctx.events().is_empty());
        drop(ctx);

        assert_eq!(env.state, before);
        assert_eq!(env.queued(epoch).len(), 1);
    }
}

#[test]
fn test_random_undelegate_always_queues_immediately() {
    let mut rng = TestRng::new(0x5eed_0003);
    let mut env = Env::new();
    let mut expected = Vec::new();
    for _ in 0..CASES {
        let epoch = random_epoch(&mut rng);
        env.module
            .epochs()
            .set_epoch_number(&mut env.state, epoch)
            .unwrap();
        let msg = MsgUndelegate {
            delegator_address: rng.account().to_string(),
            validator_address: rng.validator_address().to_string(),
            amount: stake(rng.amount(1, 1_000_000)),
        };

        let height = rng.next_u64() % 1_000_000 + 1;
        {
            let mut ctx = Context::new(&mut env.state, header(height, T0));
            // No such validator, so the projection fails but the action stays.
            assert_eq!(
                env.module.msg_server().undelegate(&mut ctx, msg.clone()),
                Err(StakingError::NoValidatorFound)
            );
        }
        expected.push(EpochAction::Undelegate(msg));

        assert_eq!(env.queued(IMMEDIATE_EPOCH), expected);
        assert!(env.queued(epoch).is_empty());
    }
}

// --- Service surface ---

#[test]
fn test_service_call_dispatch() {
    let mut env = Env::new();
    env.fund(3, 100);
    let module = &env.module;
    let mut ctx = Context::new(&mut env.state, header(10, T0));

    let params = delegate_msg(3, 1, stake(10)).encode();
    let out = module
        .handle_service_call(&mut ctx, "delegate@v1", &params)
        .unwrap();
    assert_eq!(
        MsgDelegateResponse::decode(&mut out.as_slice()).unwrap(),
        MsgDelegateResponse {}
    );

    assert_eq!(
        module.handle_service_call(&mut ctx, "slash@v1", &params),
        Err(StakingError::UnknownMethod("slash@v1".into()))
    );
    assert!(matches!(
        module.handle_service_call(&mut ctx, "undelegate@v1", &[0xff]),
        Err(StakingError::Deserialization(_))
    ));

    let zero = undelegate_msg(3, 1, stake(0)).encode();
    assert!(matches!(
        module.handle_service_call(&mut ctx, "undelegate@v1", &zero),
        Err(StakingError::InvalidAmount(_))
    ));
    drop(ctx);
    assert!(env.queued(IMMEDIATE_EPOCH).is_empty());
    assert_eq!(env.queued(FIRST_EPOCH).len(), 1);
}

#[test]
fn test_service_call_undelegate_returns_completion_time() -> anyhow::Result<()> {
    let mut env = Env::new();
    env.bootstrap(&[1], &[]);
    let module = &env.module;
    let mut ctx = Context::new(&mut env.state, header(EPOCH_LEN, T0 + 2500));

    let params = undelegate_msg(1, 1, stake(10)).encode();
    let out = module.handle_service_call(&mut ctx, "undelegate@v1", &params)?;
    let resp = MsgUndelegateResponse::decode(&mut out.as_slice())?;
    assert_eq!(
        resp.completion_time,
        T0 + 2500 + EPOCH_LEN * BLOCK_TIME + UNBONDING
    );
    Ok(())
}

#[test]
fn test_on_end_block_runs_only_at_boundaries() {
    let mut env = Env::new();
    env.fund(1, 1_000);
    {
        let mut ctx = Context::new(&mut env.state, header(10, T0));
        assert_ok!(env
            .module
            .msg_server()
            .create_validator(&mut ctx, create_validator_msg(1, stake(100))));
    }

    let mut ctx = Context::new(&mut env.state, header(EPOCH_LEN - 1, T0));
    assert_eq!(env.module.on_end_block(&mut ctx).unwrap(), None);
    drop(ctx);
    assert_eq!(env.queued(FIRST_EPOCH).len(), 1);

    let mut ctx = Context::new(&mut env.state, header(EPOCH_LEN, T0 + 5));
    let report = env.module.on_end_block(&mut ctx).unwrap().unwrap();
    assert_eq!(report.epoch, FIRST_EPOCH);
    assert_eq!(report.applied, 1);
}
