use std::path::{Path, PathBuf};

/// A self-contained miniature web codebase for integration tests.
///
/// Structure (repo-relative):
///   tsconfig.json                       path aliases: services/*, pages/*, filters/*
///   .gitignore                          ignores build/
///   assets/constants.ts                 AppConstants tree (PAGES.ABOUT.ROUTE)
///   core/templates/pages/oppia-root/
///     oppia-root.import.ts              webpack entry -> app.module
///     app.module.ts                     NgModule -> routing module
///     routing/app.routing.module.ts     routes: about (lazy), topic_editor (lazy)
///   core/templates/pages/lightweight-oppia-root/
///     lightweight-oppia-root.import.ts  entry -> lightweight routing
///     routing/app.routing.module.ts     empty routes
///   core/templates/pages/about-page/
///     about-page.import.ts              entry -> about-page.module
///     about-page.mainpage.html          <oppia-about-page> + css link
///     about-page.module.ts              NgModule, imports component + pipe
///     about-page.component.ts           @Component oppia-about-page, templateUrl
///     about-page.component.html         uses the truncate pipe
///     about-page.component.spec.ts      frontend unit test
///   core/templates/pages/topic-editor-page/topic-editor-page.module.ts
///   core/templates/services/alerts.service.ts
///   core/templates/filters/truncate.pipe.ts
///   core/templates/css/oppia.css
///   core/tests/ci-test-suite-configs/acceptance.json
///
/// Properties:
///   - two page modules (about, topic editor), reached lazily from the
///     main routing table; the about route path comes from AppConstants
///   - a selector edge (mainpage -> component), a pipe edge
///     (component template -> pipe), a css edge (mainpage -> oppia.css)
///   - every root is a page module, an .import.ts entry, or a spec file,
///     so the full pipeline validates cleanly
pub struct TestRepo {
    pub dir: tempfile::TempDir,
}

impl TestRepo {
    /// Create the standard fixture. Caller must keep the returned value
    /// alive (dropping `TempDir` deletes the files).
    pub fn new() -> Self {
        let repo = Self {
            dir: tempfile::tempdir().unwrap(),
        };

        repo.write(
            "tsconfig.json",
            r#"{
  "compilerOptions": {
    "paths": {
      "services/*": ["core/templates/services/*"],
      "pages/*": ["core/templates/pages/*"],
      "filters/*": ["core/templates/filters/*"]
    }
  }
}
"#,
        );
        repo.write(".gitignore", "# build output\nbuild/\n");

        repo.write(
            "assets/constants.ts",
            r#"export default {
  PAGES: {
    ABOUT: {
      ROUTE: 'about',
      TITLE: 'About'
    }
  }
} as const;
"#,
        );

        // Main application root.
        repo.write(
            "core/templates/pages/oppia-root/oppia-root.import.ts",
            "import './app.module';\n",
        );
        repo.write(
            "core/templates/pages/oppia-root/app.module.ts",
            r"import { AppRoutingModule } from './routing/app.routing.module';

@NgModule({
  imports: [AppRoutingModule]
})
export class AppModule {}
",
        );
        repo.write(
            "core/templates/pages/oppia-root/routing/app.routing.module.ts",
            r"import AppConstants from 'assets/constants';

const routes = [
  {
    path: AppConstants.PAGES.ABOUT.ROUTE,
    loadChildren: () =>
      import('pages/about-page/about-page.module').then(
        m => m.AboutPageModule)
  },
  {
    path: 'topic_editor/:topic_id',
    pathMatch: 'full',
    loadChildren: () =>
      import('pages/topic-editor-page/topic-editor-page.module').then(
        m => m.TopicEditorPageModule)
  }
];

@NgModule({
  imports: [RouterModule.forRoot(routes)]
})
export class AppRoutingModule {}
",
        );

        // Lightweight root.
        repo.write(
            "core/templates/pages/lightweight-oppia-root/lightweight-oppia-root.import.ts",
            "import './routing/app.routing.module';\n",
        );
        repo.write(
            "core/templates/pages/lightweight-oppia-root/routing/app.routing.module.ts",
            "export const routes = [];\n",
        );

        // About page.
        repo.write(
            "core/templates/pages/about-page/about-page.import.ts",
            "import 'pages/about-page/about-page.module';\n",
        );
        repo.write(
            "core/templates/pages/about-page/about-page.mainpage.html",
            r#"<!DOCTYPE html>
<html>
  <head>
    <link rel="preload" href="/templates/css/oppia.css">
  </head>
  <body>
    <oppia-about-page></oppia-about-page>
  </body>
</html>
"#,
        );
        repo.write(
            "core/templates/pages/about-page/about-page.module.ts",
            r"import { AboutPageComponent } from './about-page.component';
import { TruncatePipe } from 'filters/truncate.pipe';

@NgModule({
  declarations: [AboutPageComponent, TruncatePipe]
})
export class AboutPageModule {}
",
        );
        repo.write(
            "core/templates/pages/about-page/about-page.component.ts",
            r"import { AlertsService } from 'services/alerts.service';

@Component({
  selector: 'oppia-about-page',
  templateUrl: './about-page.component.html'
})
export class AboutPageComponent {}
",
        );
        repo.write(
            "core/templates/pages/about-page/about-page.component.html",
            "<h1>{{ title | truncate:64 }}</h1>\n",
        );
        repo.write(
            "core/templates/pages/about-page/about-page.component.spec.ts",
            r"import { AboutPageComponent } from './about-page.component';

describe('AboutPageComponent', () => {
  it('exists', () => expect(AboutPageComponent).toBeDefined());
});
",
        );

        // Topic editor page.
        repo.write(
            "core/templates/pages/topic-editor-page/topic-editor-page.module.ts",
            r"@NgModule({})
export class TopicEditorPageModule {}
",
        );

        // Shared code.
        repo.write(
            "core/templates/services/alerts.service.ts",
            r"@Injectable({ providedIn: 'root' })
export class AlertsService {}
",
        );
        repo.write(
            "core/templates/filters/truncate.pipe.ts",
            r"@Pipe({ name: 'truncate' })
export class TruncatePipe {}
",
        );
        repo.write("core/templates/css/oppia.css", "body { margin: 0; }\n");

        repo.write(
            "core/tests/ci-test-suite-configs/acceptance.json",
            r#"{"suites": [{"name": "navigation", "module": "core/tests/suite-navigation.ts"}]}
"#,
        );

        repo
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write (or overwrite) a repo-relative file.
    pub fn write(&self, rel: &str, content: &str) {
        let abs = self.path(rel);
        std::fs::create_dir_all(abs.parent().unwrap()).unwrap();
        std::fs::write(abs, content).unwrap();
    }
}
