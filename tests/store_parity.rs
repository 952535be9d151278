//! Runs the same list queries against the in-memory store and PostgreSQL
//! and expects identical pages. Needs `DATABASE_URL`; skipped without it.

use bootcamp_api::seed::data::places;
use bootcamp_api::{
    load_seed_data, AdvancedResults, AllowList, Bootcamp, Condition, Course, DocumentStore,
    FindQuery, Filter, MemoryStore, PaginationDefaults, PostgresStore, QueryRequest, Resource,
    Review, Sphere,
};
use serde_json::Value;

struct Parity {
    memory: MemoryStore,
    postgres: PostgresStore,
    /// Unique per run so parallel runs never see each other's rows.
    prefix: String,
}

impl Parity {
    async fn connect() -> Option<Self> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            println!("DATABASE_URL not set, skipping store parity test");
            return None;
        };

        let postgres = PostgresStore::new(&database_url, 4).await.unwrap();
        postgres.migrate().await.unwrap();

        let memory = MemoryStore::new();
        load_seed_data(&memory).await.unwrap();

        let parity = Self {
            memory,
            postgres,
            prefix: format!("parity_{}_", uuid::Uuid::new_v4().simple()),
        };
        for collection in [Bootcamp::COLLECTION, Course::COLLECTION, Review::COLLECTION] {
            parity.copy(collection).await;
        }
        Some(parity)
    }

    fn collection(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Copy in insertion order so tie-breaks agree.
    async fn copy(&self, collection: &str) {
        let documents = self
            .memory
            .find(collection, &FindQuery::new(Filter::new()))
            .await
            .unwrap();
        let target = self.collection(collection);
        for document in documents {
            self.postgres.insert(&target, document).await.unwrap();
        }
    }

    async fn cleanup(&self) {
        for collection in [Bootcamp::COLLECTION, Course::COLLECTION, Review::COLLECTION] {
            self.postgres
                .delete_many(&self.collection(collection), &Filter::new())
                .await
                .unwrap();
        }
    }

    /// Run one query on both stores, assert they agree and return the ids.
    async fn check<R: Resource>(&self, pairs: &[(&str, &str)]) -> Vec<String> {
        let adapter = AdvancedResults::new(
            AllowList::new(R::ALLOW_LIST.iter().copied()),
            PaginationDefaults::default(),
        );
        let request = QueryRequest::from_pairs(pairs.iter().copied());

        let from_memory = adapter.run(&self.memory, R::COLLECTION, &request).await.unwrap();
        let from_postgres = adapter
            .run(&self.postgres, &self.collection(R::COLLECTION), &request)
            .await
            .unwrap();

        let memory_page = from_memory.page().unwrap();
        let postgres_page = from_postgres.page().unwrap();
        let memory_ids = ids(&memory_page.data);
        assert_eq!(memory_ids, ids(&postgres_page.data), "ids differ for {:?}", pairs);
        assert_eq!(memory_page.count, postgres_page.count, "count differs for {:?}", pairs);
        assert_eq!(
            memory_page.total_count, postgres_page.total_count,
            "totalCount differs for {:?}",
            pairs
        );
        assert_eq!(memory_page.pagination, postgres_page.pagination, "pagination differs for {:?}", pairs);
        memory_ids
    }

    async fn check_find(&self, collection: &str, filter: Filter) -> Vec<String> {
        let query = FindQuery::new(filter);
        let from_memory = self.memory.find(collection, &query).await.unwrap();
        let from_postgres = self.postgres.find(&self.collection(collection), &query).await.unwrap();
        assert_eq!(ids(&from_memory), ids(&from_postgres));
        ids(&from_memory)
    }
}

fn ids(documents: &[bootcamp_api::Document]) -> Vec<String> {
    documents
        .iter()
        .filter_map(|document| document.get("_id").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_bootcamp_queries_agree() {
    let Some(parity) = Parity::connect().await else {
        return;
    };

    assert_eq!(parity.check::<Bootcamp>(&[("averageCost", "9000")]).await.len(), 2);
    parity.check::<Bootcamp>(&[("averageCost[lte]", "10000")]).await;
    parity
        .check::<Bootcamp>(&[("averageCost[gt]", "8000"), ("averageCost[lt]", "12000")])
        .await;
    parity.check::<Bootcamp>(&[("averageRating[gte]", "8")]).await;
    parity.check::<Bootcamp>(&[("careers[in]", "Data Science")]).await;
    parity
        .check::<Bootcamp>(&[("careers[in]", "UI/UX"), ("careers[in]", "Data Science")])
        .await;
    parity.check::<Bootcamp>(&[("careers", "UI/UX")]).await;
    parity.check::<Bootcamp>(&[("name", "dev")]).await;
    parity.check::<Bootcamp>(&[("name", "DEV")]).await;
    parity.check::<Bootcamp>(&[("housing", "true")]).await;
    parity.check::<Bootcamp>(&[("sort", "name")]).await;
    parity.check::<Bootcamp>(&[("sort", "-averageCost,name")]).await;
    parity.check::<Bootcamp>(&[("limit", "1"), ("page", "2")]).await;
    parity.check::<Bootcamp>(&[("select", "name"), ("sort", "-name")]).await;

    parity.cleanup().await;
}

#[tokio::test]
async fn test_course_and_review_queries_agree() {
    let Some(parity) = Parity::connect().await else {
        return;
    };

    assert_eq!(parity.check::<Course>(&[("tuition", "8000")]).await.len(), 2);
    assert_eq!(parity.check::<Course>(&[("weeks[lte]", "8")]).await.len(), 2);
    parity.check::<Course>(&[("weeks", "12")]).await;
    parity.check::<Course>(&[("minimumSkill[in]", "beginner")]).await;
    parity
        .check::<Course>(&[("tuition[gte]", "10000"), ("sort", "-tuition,title")])
        .await;
    parity.check::<Course>(&[("scholarshipAvailable", "false")]).await;
    parity.check::<Course>(&[("title", "UI/UX")]).await;
    parity.check::<Course>(&[("title[gte]", "M"), ("sort", "title")]).await;

    parity.check::<Review>(&[("rating[gt]", "7")]).await;
    parity.check::<Review>(&[("sort", "rating")]).await;

    parity.cleanup().await;
}

#[tokio::test]
async fn test_radius_filter_agrees() {
    let Some(parity) = Parity::connect().await else {
        return;
    };

    let Some((_, boston)) = places().into_iter().find(|(zipcode, _)| zipcode == "02215") else {
        panic!("seed places lack 02215");
    };
    for (distance, expected) in [(10.0, 1), (50.0, 2), (150.0, 3), (1000.0, 4)] {
        let filter = Filter::new().with("location", Condition::Within(Sphere::around(&boston, distance)));
        assert_eq!(parity.check_find(Bootcamp::COLLECTION, filter).await.len(), expected);
    }

    parity.cleanup().await;
}
