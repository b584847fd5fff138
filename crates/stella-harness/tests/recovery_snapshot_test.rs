//! Snapshot of a failed transition and its corrective navigation.

use stella_harness::{Effect, SimHost, Step};

#[tokio::test(start_paused = true)]
async fn render_failure_recovers_to_safe_default() {
    let mut host = SimHost::builder().signed_in("customer").build().unwrap();
    host.scripts.fail("cart", Step::Render);

    host.go("cart").await.unwrap();

    let trace: Vec<Effect> = host
        .journal
        .effects()
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                Effect::PushState { .. }
                    | Effect::Created { .. }
                    | Effect::Rendered { .. }
                    | Effect::Initialized { .. }
                    | Effect::CleanedUp { .. }
                    | Effect::Notified { .. }
            )
        })
        .collect();

    insta::assert_json_snapshot!(trace, @r###"
    [
      {
        "effect": "push_state",
        "fragment": "#cart",
        "title": "Shopping Cart"
      },
      {
        "effect": "created",
        "route": "cart",
        "instance": 1
      },
      {
        "effect": "cleaned_up",
        "route": "cart",
        "instance": 1
      },
      {
        "effect": "notified",
        "message": "Navigation failed",
        "severity": "error"
      },
      {
        "effect": "push_state",
        "fragment": "#customer-home",
        "title": "Home"
      },
      {
        "effect": "created",
        "route": "customer-home",
        "instance": 2
      },
      {
        "effect": "rendered",
        "route": "customer-home",
        "instance": 2
      },
      {
        "effect": "initialized",
        "route": "customer-home",
        "instance": 2
      }
    ]
    "###);
}
