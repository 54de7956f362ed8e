use dealership_server::{
    build_router,
    client::DealershipClient,
    db::init_db,
    error::DealershipError,
    models::{
        CreateClientRequest, OrderItem, PartsOrderRequest, PriceRange, VehiclePurchaseRequest,
        VehicleRequest,
    },
    AppState,
};

async fn spawn_server() -> DealershipClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr");
    let app = build_router(AppState::new(init_db(true)));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server should run");
    });
    DealershipClient::new(&format!("http://{addr}")).expect("client should build")
}

#[tokio::test]
async fn browse_and_order_parts() {
    let api = spawn_server().await;

    let parts = api
        .items_by_model(
            "Mercedes C-Class",
            &PriceRange {
                min_price: None,
                max_price: Some(300.0),
            },
        )
        .await
        .expect("parts by model");
    assert_eq!(
        parts.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        vec!["tyres", "strut"]
    );

    let order = api
        .create_order(&PartsOrderRequest {
            client_id: 1,
            auto_id: Some(1),
            date: None,
            items: vec![OrderItem { id: 1, quantity: 3 }],
            price: 600.0,
        })
        .await
        .expect("order should commit");
    assert_eq!(order.id, 1);

    let err = api.item(1).await.unwrap_err();
    assert!(matches!(err, DealershipError::NotFound { entity: "Part", .. }));
}

#[tokio::test]
async fn rejected_order_carries_ids() {
    let api = spawn_server().await;

    let err = api
        .create_order(&PartsOrderRequest {
            client_id: 1,
            auto_id: None,
            date: None,
            items: vec![OrderItem { id: 42, quantity: 1 }],
            price: 0.0,
        })
        .await
        .unwrap_err();
    assert_eq!(err, DealershipError::OrderRejected(vec![42]));
    assert!(api.orders().await.expect("orders").is_empty());
}

#[tokio::test]
async fn purchase_vehicle() {
    let api = spawn_server().await;
    let client = api
        .create_client(&CreateClientRequest {
            name: "Ivan".to_string(),
            phone: "111".to_string(),
        })
        .await
        .expect("client");
    let vehicle = api
        .create_auto(&VehicleRequest {
            brand: "BMW".to_string(),
            model_type: "BMW X5".to_string(),
            year: 2021,
            price: 20000.0,
        })
        .await
        .expect("vehicle");

    let order = api
        .create_auto_deal(&VehiclePurchaseRequest {
            client_id: client.id,
            auto_id: vehicle.id,
            date: Some("02.12.2023".to_string()),
            price: vehicle.price,
            model_type: None,
            year: None,
        })
        .await
        .expect("deal");
    assert!(order.is_vehicle_purchase());

    let client = api.client(client.id).await.expect("client");
    assert_eq!(client.autos, vec![vehicle.ownership()]);
    assert_eq!(api.auto_deals().await.expect("deals").len(), 1);

    let err = api
        .create_auto_deal(&VehiclePurchaseRequest {
            client_id: 99,
            auto_id: vehicle.id,
            date: None,
            price: 1.0,
            model_type: None,
            year: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DealershipError::NotFound { .. }));
}

#[tokio::test]
async fn unreachable_server_is_network_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let api = DealershipClient::new(&format!("http://{addr}")).expect("client should build");
    let err = api.clients().await.unwrap_err();
    assert!(matches!(err, DealershipError::NetworkFailure(_)));
}
