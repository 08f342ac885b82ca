//! End-to-end run protocol: catalog → selection → orchestrator → view.

use basketlab_core::{
    BacktestResultRow, BasketCatalog, Catalog, Orchestrator, Params, PnlSign, RunOutcome,
    RunRejected, RunState, SelectionState, Strategy,
};

fn catalog() -> Catalog {
    let strategies = vec![
        Strategy {
            id: "momentum".into(),
            name: "Momentum ML".into(),
            params: Params::new(),
        },
        Strategy {
            id: "mean_reversion".into(),
            name: "Mean Reversion".into(),
            params: Params::new(),
        },
    ];
    let baskets: BasketCatalog = [
        ("TOP_3", vec!["BTCUSDT".to_string(), "ETHUSDT".to_string(), "SOLUSDT".to_string()]),
        ("ETH", vec!["ETHUSDT".to_string()]),
    ]
    .into_iter()
    .collect();
    Catalog::new(strategies, baskets)
}

#[test]
fn seeded_selection_drives_first_run() {
    let catalog = catalog();
    let mut selection = SelectionState::new();
    selection.seed_from(&catalog);

    let mut orch = Orchestrator::new();
    let request = orch.begin(&selection, &catalog.baskets).unwrap();
    assert_eq!(request.strategy, "momentum");
    assert_eq!(request.basket, vec!["BTCUSDT", "ETHUSDT", "SOLUSDT"]);

    // Service answers out of order and omits SOLUSDT.
    let rows = vec![
        BacktestResultRow::new("ETHUSDT", "-4.00", 1, "-4.00"),
        BacktestResultRow::new("BTCUSDT", "10.50", 3, "3.50"),
    ];
    assert_eq!(orch.complete::<String>(Ok(rows.clone())), RunOutcome::Applied { rows: 2 });
    assert_eq!(&orch.results()[..], &rows[..]);

    let view = orch.view();
    assert_eq!(view.per_symbol[0].name, "ETHUSDT");
    assert_eq!(view.total_pnl, 6.5);
    assert_eq!(view.sign(), PnlSign::NonNegative);
}

#[test]
fn selection_change_only_affects_next_run() {
    let catalog = catalog();
    let mut selection = SelectionState::new();
    selection.seed_from(&catalog);

    let mut orch = Orchestrator::new();
    let first = orch.begin(&selection, &catalog.baskets).unwrap();

    selection.select_strategy("mean_reversion");
    selection.select_basket("ETH");
    assert_eq!(orch.in_flight(), Some(&first.fingerprint()));
    orch.complete::<String>(Ok(vec![]));

    let second = orch.begin(&selection, &catalog.baskets).unwrap();
    assert_eq!(second.strategy, "mean_reversion");
    assert_eq!(second.basket, vec!["ETHUSDT"]);
}

#[test]
fn unloaded_catalog_never_dispatches() {
    let catalog = Catalog::default();
    let mut selection = SelectionState::new();
    selection.seed_from(&catalog);

    let mut orch = Orchestrator::new();
    assert_eq!(orch.begin(&selection, &catalog.baskets), Err(RunRejected::NotReady));
    assert_eq!(orch.state(), RunState::Idle);
}

#[test]
fn basket_missing_from_catalog_fails_closed() {
    let catalog = catalog();
    let mut selection = SelectionState::new();
    selection.seed_from(&catalog);
    selection.select_basket("MEME");

    let mut orch = Orchestrator::new();
    assert_eq!(
        orch.begin(&selection, &catalog.baskets),
        Err(RunRejected::UnknownBasket("MEME".into()))
    );
    assert!(orch.in_flight().is_none());
    assert!(!orch.is_running());
}

#[test]
fn empty_success_clears_previous_results() {
    let catalog = catalog();
    let mut selection = SelectionState::new();
    selection.seed_from(&catalog);

    let mut orch = Orchestrator::new();
    orch.begin(&selection, &catalog.baskets).unwrap();
    orch.complete::<String>(Ok(vec![BacktestResultRow::new("BTCUSDT", "1.00", 1, "1.00")]));
    assert!(!orch.view().is_empty());

    orch.begin(&selection, &catalog.baskets).unwrap();
    orch.complete::<String>(Ok(vec![]));
    assert!(orch.results().is_empty());
    assert!(orch.view().is_empty());
    assert_eq!(orch.view().total_pnl, 0.0);
}
