// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::{
    error::{Error, Result},
    gateway::Request,
    sync::{Messages, Resource, Writable},
};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductoSummary {
    pub(crate) codigo: String,
    pub(crate) nombre: String,
}

#[derive(Clone, Debug, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Empresa {
    #[tabled(rename = "NIT")]
    pub(crate) nit: String,
    #[tabled(rename = "Nombre")]
    pub(crate) nombre: String,
    #[tabled(rename = "Direccion")]
    pub(crate) direccion: String,
    #[tabled(rename = "Telefono")]
    pub(crate) telefono: String,
    #[serde(default)]
    #[tabled(rename = "Productos", display_with = "Self::format_productos")]
    pub(crate) productos: Vec<ProductoSummary>,
}

impl Empresa {
    fn format_productos(productos: &[ProductoSummary]) -> String {
        productos
            .iter()
            .map(|producto| format!("{} {}", producto.codigo, producto.nombre))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EmpresaInput {
    pub(crate) nit: String,
    pub(crate) nombre: String,
    pub(crate) direccion: String,
    pub(crate) telefono: String,
}

/// The NIT identifies the company and cannot change, so it only appears in the
/// path.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EmpresaUpdate {
    pub(crate) nombre: String,
    pub(crate) direccion: String,
    pub(crate) telefono: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub(crate) struct Precio {
    pub(crate) moneda: String,
    pub(crate) valor: f64,
}

impl fmt::Display for Precio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.moneda, self.valor)
    }
}

/// Parses `MONEDA:VALOR`, e.g. `cop:15000`. The currency is upper-cased and
/// must be three ASCII letters; the value must be positive.
impl FromStr for Precio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (moneda, valor) = s
            .split_once(':')
            .ok_or_else(|| Error::Invalid(format!("El precio {s:?} debe tener la forma MONEDA:VALOR")))?;

        let moneda = moneda.trim().to_ascii_uppercase();
        if moneda.len() != 3 || !moneda.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::Invalid(
                "La moneda debe tener formato ISO 4217".to_owned(),
            ));
        }

        let valor = valor
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|valor| valor.is_finite() && *valor > 0.0)
            .ok_or_else(|| Error::Invalid("El valor debe ser positivo".to_owned()))?;

        Ok(Self { moneda, valor })
    }
}

#[derive(Clone, Debug, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Producto {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Codigo")]
    pub(crate) codigo: String,
    #[tabled(rename = "Nombre")]
    pub(crate) nombre: String,
    #[tabled(rename = "Caracteristicas", display_with = "Self::format_caracteristicas")]
    pub(crate) caracteristicas: Option<String>,
    // LINT: Kept for the wire format; listings are already scoped by company.
    #[allow(dead_code)]
    #[tabled(skip)]
    pub(crate) empresa_nit: String,
    #[tabled(rename = "Precios", display_with = "Self::format_precios")]
    pub(crate) precios: Vec<Precio>,
    #[tabled(rename = "Categorias", display_with = "Self::format_categorias")]
    #[serde(default)]
    pub(crate) categorias: Vec<String>,
}

impl Producto {
    fn format_caracteristicas(caracteristicas: &Option<String>) -> String {
        caracteristicas.clone().unwrap_or_default()
    }

    fn format_precios(precios: &[Precio]) -> String {
        precios
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn format_categorias(categorias: &[String]) -> String {
        categorias.join(", ")
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductoInput {
    pub(crate) codigo: String,
    pub(crate) nombre: String,
    pub(crate) caracteristicas: Option<String>,
    pub(crate) empresa_nit: String,
    pub(crate) precios: Vec<Precio>,
    pub(crate) categorias: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Tabled)]
pub(crate) struct Categoria {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Nombre")]
    pub(crate) nombre: String,
}

pub(crate) struct Empresas;

impl Resource for Empresas {
    type Scope = ();
    type Value = Vec<Empresa>;

    const LOAD_FAILED: &'static str = "No fue posible cargar las empresas";

    fn read(_: &()) -> Request {
        Request::get("/empresas")
    }
}

impl Writable for Empresas {
    type Input = EmpresaInput;
    type Patch = EmpresaUpdate;

    const MESSAGES: Messages = Messages {
        created: "Empresa creada correctamente.",
        updated: "Empresa actualizada correctamente.",
        deleted: "Empresa eliminada.",
        create_failed: "No fue posible crear la empresa",
        update_failed: "No fue posible actualizar la empresa",
        delete_failed: "No fue posible eliminar la empresa",
    };

    fn create(input: &EmpresaInput) -> Result<Request> {
        Request::post("/empresas").with_json(input)
    }

    fn update(nit: &str, patch: &EmpresaUpdate) -> Result<Request> {
        Request::put(format!("/empresas/{nit}")).with_json(patch)
    }

    fn delete(nit: &str) -> Request {
        Request::delete(format!("/empresas/{nit}"))
    }
}

/// Products of one company, scoped by the company's NIT.
pub(crate) struct Productos;

impl Resource for Productos {
    type Scope = String;
    type Value = Vec<Producto>;

    const LOAD_FAILED: &'static str = "No fue posible cargar los productos";

    fn read(empresa_nit: &String) -> Request {
        Request::get("/productos").with_query("empresaNit", empresa_nit.clone())
    }
}

impl Writable for Productos {
    type Input = ProductoInput;
    type Patch = ProductoInput;

    const MESSAGES: Messages = Messages {
        created: "Producto registrado correctamente.",
        updated: "Producto actualizado correctamente.",
        deleted: "Producto eliminado.",
        create_failed: "No fue posible registrar el producto",
        update_failed: "No fue posible actualizar el producto",
        delete_failed: "No fue posible eliminar el producto",
    };

    fn create(input: &ProductoInput) -> Result<Request> {
        Request::post("/productos").with_json(input)
    }

    fn update(id: &str, patch: &ProductoInput) -> Result<Request> {
        Request::put(format!("/productos/{id}")).with_json(patch)
    }

    fn delete(id: &str) -> Request {
        Request::delete(format!("/productos/{id}"))
    }
}

pub(crate) struct Categorias;

impl Resource for Categorias {
    type Scope = ();
    type Value = Vec<Categoria>;

    const LOAD_FAILED: &'static str = "No fue posible cargar las categorias";

    fn read(_: &()) -> Request {
        Request::get("/categorias")
    }
}
