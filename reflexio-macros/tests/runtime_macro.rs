use std::time::SystemTime;

#[reflexio::runtime]
async fn runtime_with_tasks() {
    reflexio::utils::task::run(async move {
        reflexio::utils::sleep(std::time::Duration::from_millis(100)).await;
    })
    .expect("Task should spawn");

    reflexio::utils::task::run(async move {
        reflexio::utils::sleep(std::time::Duration::from_millis(100)).await;
    })
    .expect("Task should spawn");
}

#[reflexio::runtime]
async fn runtime_with_result() -> Result<u8, reflexio::errors::Error> {
    Ok(42)
}

// One test only: runtime functions install the global task sender and must
// not run concurrently.
#[test]
fn test_runtime_expansion() {
    let start = SystemTime::now();
    runtime_with_tasks();
    let duration = SystemTime::now().duration_since(start).unwrap().as_millis();
    assert!(
        duration >= 100,
        "Runtime should wait on spawned tasks (took {}ms)",
        duration
    );

    assert_eq!(
        runtime_with_result().unwrap(),
        42,
        "Runtime should preserve the return value"
    );
}
