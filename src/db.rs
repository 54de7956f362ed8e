//! Database Module
//! メモリ上の clients/autos/items/orders の管理

use tracing::info;

use crate::error::DealershipError;
use crate::inventory::Ledger;
use crate::models::{
    Client, ClientId, CreateClientRequest, Part, UpdateClientRequest, Vehicle, VehicleId,
    VehicleRequest,
};
use crate::orders::OrderBook;

/// ディーラーの全データ（プロセス生存期間のみ保持）
#[derive(Debug, Clone, Default)]
pub struct Dealership {
    pub clients: Vec<Client>,
    pub vehicles: Vec<Vehicle>,
    pub ledger: Ledger,
    pub orders: OrderBook,
    last_client_id: ClientId,
    last_vehicle_id: VehicleId,
}

/// ストアを初期化
pub fn init_db(seed_inventory: bool) -> Dealership {
    let db = if seed_inventory {
        Dealership::with_ledger(Ledger::from_parts(sample_parts()))
    } else {
        Dealership::default()
    };

    info!(
        "Store initialized: parts={}, models={}",
        db.ledger.len(),
        db.ledger.all_models().len()
    );
    db
}

impl Dealership {
    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            ledger,
            ..Self::default()
        }
    }

    // ========================================
    // Clients
    // ========================================

    pub fn client(&self, id: ClientId) -> Result<&Client, DealershipError> {
        self.clients
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| DealershipError::not_found("Client", id))
    }

    pub fn create_client(&mut self, req: CreateClientRequest) -> Client {
        self.last_client_id += 1;
        let client = Client {
            id: self.last_client_id,
            name: req.name,
            phone: req.phone,
            autos: Vec::new(),
        };
        self.clients.push(client.clone());
        client
    }

    pub fn update_client(
        &mut self,
        id: ClientId,
        req: UpdateClientRequest,
    ) -> Result<Client, DealershipError> {
        let client = self
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DealershipError::not_found("Client", id))?;
        client.name = req.name;
        client.phone = req.phone;
        // 所有車両の更新
        if let Some(autos) = req.autos {
            client.autos = autos;
        }
        Ok(client.clone())
    }

    // ========================================
    // Vehicles
    // ========================================

    pub fn vehicle(&self, id: VehicleId) -> Result<&Vehicle, DealershipError> {
        self.vehicles
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| DealershipError::not_found("Vehicle", id))
    }

    pub fn create_vehicle(&mut self, req: VehicleRequest) -> Vehicle {
        self.last_vehicle_id += 1;
        let vehicle = Vehicle {
            id: self.last_vehicle_id,
            brand: req.brand,
            model_type: req.model_type,
            year: req.year,
            price: req.price,
        };
        self.vehicles.push(vehicle.clone());
        vehicle
    }

    pub fn replace_vehicle(
        &mut self,
        id: VehicleId,
        req: VehicleRequest,
    ) -> Result<Vehicle, DealershipError> {
        let vehicle = self
            .vehicles
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| DealershipError::not_found("Vehicle", id))?;
        *vehicle = Vehicle {
            id,
            brand: req.brand,
            model_type: req.model_type,
            year: req.year,
            price: req.price,
        };
        Ok(vehicle.clone())
    }

    /// 販売車両の削除（顧客の所有リストはそのまま）
    pub fn delete_vehicle(&mut self, id: VehicleId) -> Result<Vehicle, DealershipError> {
        let index = self
            .vehicles
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| DealershipError::not_found("Vehicle", id))?;
        Ok(self.vehicles.remove(index))
    }
}

/// サンプル部品カタログ
fn sample_parts() -> Vec<Part> {
    let rows: [(&str, &[&str], f64, u32); 10] = [
        ("windshield", &["Nissan Altima", "Ford Mustang"], 200.0, 3),
        ("headlight", &["BMW", "Hyundai Sonata"], 180.0, 5),
        ("shock absorber", &["Honda Accord", "Volkswagen Golf"], 250.0, 2),
        ("bumper", &["Toyota Camry", "Chevrolet Cruze"], 300.0, 4),
        ("wheel rims", &["Audi A4", "Mercedes C-Class"], 400.0, 3),
        ("side mirror", &["Nissan Altima", "Ford Mustang"], 220.0, 6),
        (
            "tyres",
            &["BMW X5", "Hyundai Sonata", "Ford Mustang", "Mercedes C-Class"],
            150.0,
            15,
        ),
        ("oil filter", &["Honda Accord", "Volkswagen Golf"], 120.0, 8),
        ("battery", &["Toyota Camry", "Chevrolet Cruze"], 350.0, 5),
        ("strut", &["Audi A4", "Mercedes C-Class", "Volkswagen Golf"], 280.0, 4),
    ];

    rows.iter()
        .zip(1..)
        .map(|((name, models, price, quantity), id)| Part {
            id,
            name: name.to_string(),
            description: "description".to_string(),
            compatible_models: models.iter().map(|m| m.to_string()).collect(),
            price: *price,
            quantity: *quantity,
        })
        .collect()
}
