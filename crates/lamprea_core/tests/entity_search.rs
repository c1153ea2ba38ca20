use lamprea_core::{
    filter_in_memory, Agent, AgentRepository, Client, ClientRepository, DbConfig,
    EntityRepository, EntityService, SqliteConnectionProvider,
};
use tempfile::TempDir;

fn seeded_clients() -> (TempDir, SqliteConnectionProvider) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("search.sqlite3");
    let config = DbConfig::new(path.to_str().unwrap(), "tester", "").unwrap();
    let provider = SqliteConnectionProvider::new(config);

    let clients = ClientRepository::new(&provider);
    for client in [
        Client::new(1, "Ane Etxeberria", "ane@bilbo.test"),
        Client::new(2, "ÁLAVA Distribuciones", "pedidos@alava.test"),
        Client::new(3, "Promo descuento%", "promo@shop.test"),
        Client::new(4, "Mercado_Norte", "norte@shop.test"),
        Client::new(5, "MercadoXNorte", "xnorte@shop.test"),
        Client::new(12, "Unai", "unai@bilbo.test"),
    ] {
        clients.insert(&client).unwrap();
    }
    (dir, provider)
}

fn ids(clients: &[Client]) -> Vec<i64> {
    clients.iter().map(|client| client.id).collect()
}

#[test]
fn search_matches_any_text_column_ignoring_case() {
    let (_dir, provider) = seeded_clients();
    let clients = ClientRepository::new(&provider);

    assert_eq!(ids(&clients.search("BILBO").unwrap()), vec![1, 12]);
    assert_eq!(ids(&clients.search("etxe").unwrap()), vec![1]);
}

#[test]
fn search_folds_non_ascii_letters() {
    let (_dir, provider) = seeded_clients();
    let clients = ClientRepository::new(&provider);

    assert_eq!(ids(&clients.search("álava").unwrap()), vec![2]);
}

#[test]
fn search_treats_wildcard_characters_literally() {
    let (_dir, provider) = seeded_clients();
    let clients = ClientRepository::new(&provider);

    assert_eq!(ids(&clients.search("%").unwrap()), vec![3]);
    assert_eq!(ids(&clients.search("o_n").unwrap()), vec![4]);
}

#[test]
fn search_matches_id_as_text() {
    let (_dir, provider) = seeded_clients();
    let clients = ClientRepository::new(&provider);

    assert_eq!(ids(&clients.search("12").unwrap()), vec![12]);
    assert_eq!(ids(&clients.search("1").unwrap()), vec![1, 12]);
}

#[test]
fn search_without_matches_is_empty() {
    let (_dir, provider) = seeded_clients();
    let clients = ClientRepository::new(&provider);

    assert!(clients.search("zzz-not-there").unwrap().is_empty());
}

#[test]
fn repository_empty_pattern_matches_every_row() {
    let (_dir, provider) = seeded_clients();
    let clients = ClientRepository::new(&provider);

    assert_eq!(clients.search("").unwrap(), clients.find_all().unwrap());
}

#[test]
fn service_blank_search_lists_everything() {
    let (_dir, provider) = seeded_clients();
    let service = EntityService::new(ClientRepository::new(&provider));

    let all = service.list().unwrap();
    assert_eq!(service.search("   ").unwrap(), all);
    assert_eq!(ids(&service.search("  norte ").unwrap()), vec![4, 5]);
}

#[test]
fn in_memory_filter_agrees_with_store_search() {
    let (_dir, provider) = seeded_clients();
    let clients = ClientRepository::new(&provider);
    let all = clients.find_all().unwrap();

    for text in ["bilbo", "ÁLAVA", "%", "o_n", "12", "shop"] {
        assert_eq!(
            filter_in_memory(&all, text),
            clients.search(text).unwrap(),
            "filter and search disagree on `{text}`"
        );
    }
}

#[test]
fn agent_search_covers_phone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agents.sqlite3");
    let provider =
        SqliteConnectionProvider::new(DbConfig::new(path.to_str().unwrap(), "tester", "").unwrap());
    let agents = AgentRepository::new(&provider);
    agents
        .insert(&Agent::new(7, "Mikel", "mikel@lamprea.test", "944123456"))
        .unwrap();
    agents
        .insert(&Agent::new(8, "Leire", "leire@lamprea.test", "600000000"))
        .unwrap();

    let found = agents.search("4123").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 7);
}
